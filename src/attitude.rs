// attitude.rs — 设备姿态 → 场景朝向
//
// 设备参考系为 "X 任意、Z 竖直向上"。根据当前屏幕方向先做一次固定的预旋转，
// 再绕 Z 轴做坐标系共轭，使设备轴与场景轴对齐。每个样本都重新查表，不缓存。

use glam::{Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl ScreenOrientation {
    pub const ALL: [ScreenOrientation; 4] = [
        ScreenOrientation::Portrait,
        ScreenOrientation::LandscapeRight,
        ScreenOrientation::PortraitUpsideDown,
        ScreenOrientation::LandscapeLeft,
    ];

    /// Next orientation when the device is turned a quarter clockwise.
    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub(crate) fn to_u8(self) -> u8 {
        match self {
            ScreenOrientation::Portrait => 0,
            ScreenOrientation::PortraitUpsideDown => 1,
            ScreenOrientation::LandscapeLeft => 2,
            ScreenOrientation::LandscapeRight => 3,
        }
    }

    pub(crate) fn from_u8(v: u8) -> Self {
        match v {
            1 => ScreenOrientation::PortraitUpsideDown,
            2 => ScreenOrientation::LandscapeLeft,
            3 => ScreenOrientation::LandscapeRight,
            _ => ScreenOrientation::Portrait,
        }
    }
}

/// Fixed camera-mounting correction for one screen orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenCorrection {
    /// Applied on the left of the raw device attitude.
    pub pre: Quat,
    /// Conjugates the result, remapping device X/Y onto scene X/Y.
    pub frame: Quat,
}

impl ScreenCorrection {
    pub fn for_orientation(orientation: ScreenOrientation) -> Self {
        let tilt = Quat::from_axis_angle(Vec3::X, -FRAC_PI_2);
        match orientation {
            ScreenOrientation::Portrait => Self {
                pre: tilt,
                frame: Quat::IDENTITY,
            },
            ScreenOrientation::LandscapeRight => Self {
                pre: tilt * Quat::from_axis_angle(Vec3::Y, FRAC_PI_2),
                frame: Quat::from_axis_angle(Vec3::Z, FRAC_PI_2),
            },
            ScreenOrientation::LandscapeLeft => Self {
                pre: tilt * Quat::from_axis_angle(Vec3::Y, -FRAC_PI_2),
                frame: Quat::from_axis_angle(Vec3::Z, -FRAC_PI_2),
            },
            ScreenOrientation::PortraitUpsideDown => Self {
                pre: Quat::from_axis_angle(Vec3::Z, PI) * tilt,
                frame: Quat::from_axis_angle(Vec3::Z, PI),
            },
        }
    }

    pub fn apply(&self, device: Quat) -> Quat {
        (self.frame * (self.pre * device) * self.frame.conjugate()).normalize()
    }
}

/// A device attitude sample already converted into scene terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneAttitude {
    /// Full camera rotation for spherical panoramas.
    pub rotation: Quat,
    /// Compass heading (radians) for cylindrical panoramas.
    pub heading: f32,
}

impl SceneAttitude {
    pub fn from_device(device: Quat, screen: ScreenOrientation) -> Self {
        Self {
            rotation: ScreenCorrection::for_orientation(screen).apply(device),
            heading: heading_from_attitude(device),
        }
    }
}

/// Heading of the device's screen normal, taken from the third row of the
/// attitude rotation matrix (`m31`, `m32`).
pub fn heading_from_attitude(device: Quat) -> f32 {
    let normal = device * Vec3::Z;
    PI - normal.y.atan2(normal.x) + FRAC_PI_2
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn same_rotation(a: Quat, b: Quat) -> bool {
        // q 与 -q 表示同一旋转
        a.dot(b).abs() > 1.0 - EPSILON
    }

    // 手写分量重排，对照查表结果
    fn swizzled(orientation: ScreenOrientation, aq: Quat) -> Quat {
        let axis = |angle: f32, axis: Vec3| Quat::from_axis_angle(axis, angle);
        match orientation {
            ScreenOrientation::Portrait => axis(-FRAC_PI_2, Vec3::X) * aq,
            ScreenOrientation::LandscapeRight => {
                let q = axis(-FRAC_PI_2, Vec3::X) * (axis(FRAC_PI_2, Vec3::Y) * aq);
                Quat::from_xyzw(-q.y, q.x, q.z, q.w)
            }
            ScreenOrientation::LandscapeLeft => {
                let q = axis(-FRAC_PI_2, Vec3::X) * (axis(-FRAC_PI_2, Vec3::Y) * aq);
                Quat::from_xyzw(q.y, -q.x, q.z, q.w)
            }
            ScreenOrientation::PortraitUpsideDown => {
                let q = axis(PI, Vec3::Z) * (axis(-FRAC_PI_2, Vec3::X) * aq);
                Quat::from_xyzw(-q.x, -q.y, q.z, q.w)
            }
        }
    }

    #[test]
    fn upright_portrait_device_looks_straight_ahead() {
        let upright = Quat::from_rotation_x(FRAC_PI_2);
        let scene = SceneAttitude::from_device(upright, ScreenOrientation::Portrait);
        assert!(same_rotation(scene.rotation, Quat::IDENTITY));
    }

    #[test]
    fn correction_table_matches_component_remap() {
        let samples = [
            Quat::IDENTITY,
            Quat::from_rotation_x(FRAC_PI_2),
            Quat::from_euler(glam::EulerRot::ZXY, 0.7, 1.1, -0.3),
            Quat::from_axis_angle(Vec3::new(1.0, 2.0, 3.0).normalize(), 2.2),
        ];
        for orientation in ScreenOrientation::ALL {
            let correction = ScreenCorrection::for_orientation(orientation);
            for aq in samples {
                let expected = swizzled(orientation, aq);
                let actual = correction.apply(aq);
                assert!(
                    same_rotation(actual, expected),
                    "{orientation:?}: {actual:?} != {expected:?}"
                );
            }
        }
    }

    #[test]
    fn heading_turns_with_the_device() {
        let upright = Quat::from_rotation_x(FRAC_PI_2);
        let turned = Quat::from_rotation_z(0.5) * upright;
        let delta = heading_from_attitude(upright) - heading_from_attitude(turned);
        assert!((delta - 0.5).abs() < EPSILON, "delta {delta}");
    }

    #[test]
    fn heading_of_upright_device() {
        // 屏幕法线指向 -Y：π - (-π/2) + π/2 = 2π
        let upright = Quat::from_rotation_x(FRAC_PI_2);
        assert!((heading_from_attitude(upright) - 2.0 * PI).abs() < EPSILON);
    }

    #[test]
    fn quarter_turns_cycle_back() {
        let mut o = ScreenOrientation::Portrait;
        for _ in 0..4 {
            o = o.next();
        }
        assert_eq!(o, ScreenOrientation::Portrait);
        for o in ScreenOrientation::ALL {
            assert_eq!(ScreenOrientation::from_u8(o.to_u8()), o);
        }
    }
}
