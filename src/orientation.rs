// orientation.rs — 相机朝向：欧拉角 (圆柱) 或四元数 (球面)
//
// 约定：相机朝 -Z 看；yaw 绕 +Y，pitch 绕 +X，roll 绕视线方向。
// 欧拉角合成顺序 Ry * Rx * Rz，对应 glam 的 EulerRot::YXZ。

use glam::{EulerRot, Quat};

use crate::panorama::ProjectionMode;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EulerAngles {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl EulerAngles {
    pub fn yaw_only(yaw: f32) -> Self {
        Self {
            pitch: 0.0,
            yaw,
            roll: 0.0,
        }
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }

    pub fn from_quat(q: Quat) -> Self {
        let (yaw, pitch, roll) = q.to_euler(EulerRot::YXZ);
        Self { pitch, yaw, roll }
    }
}

/// Camera orientation in the representation its projection mode calls for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraOrientation {
    /// Cylindrical panoramas: only `yaw` is live.
    Euler(EulerAngles),
    /// Spherical panoramas: free look without gimbal lock.
    Quaternion(Quat),
}

impl CameraOrientation {
    /// Orientation a freshly reset camera has in `mode`.
    pub fn initial(mode: ProjectionMode, start_angle: f32) -> Self {
        match mode {
            ProjectionMode::Cylindrical => CameraOrientation::Euler(EulerAngles::yaw_only(start_angle)),
            ProjectionMode::Spherical => CameraOrientation::Quaternion(Quat::from_rotation_y(start_angle)),
        }
    }

    pub fn euler(&self) -> EulerAngles {
        match self {
            CameraOrientation::Euler(e) => *e,
            CameraOrientation::Quaternion(q) => EulerAngles::from_quat(*q),
        }
    }

    pub fn yaw(&self) -> f32 {
        self.euler().yaw
    }

    pub fn pitch(&self) -> f32 {
        self.euler().pitch
    }

    pub fn roll(&self) -> f32 {
        self.euler().roll
    }

    /// Rotation handed to the renderer.
    pub fn rotation(&self) -> Quat {
        match self {
            CameraOrientation::Euler(e) => e.to_quat(),
            CameraOrientation::Quaternion(q) => *q,
        }
    }

    /// Re-expresses the orientation for `mode`. Going to cylindrical keeps only
    /// the heading.
    pub fn for_mode(&self, mode: ProjectionMode) -> Self {
        match (mode, self) {
            (ProjectionMode::Cylindrical, _) => CameraOrientation::Euler(EulerAngles::yaw_only(self.yaw())),
            (ProjectionMode::Spherical, CameraOrientation::Quaternion(_)) => *self,
            (ProjectionMode::Spherical, CameraOrientation::Euler(e)) => CameraOrientation::Quaternion(e.to_quat()),
        }
    }
}

/// Finger rotation accumulated on top of the sensor attitude while the
/// control method is `Combined`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureOffset {
    /// Around the camera's local X axis.
    pub total_x: f32,
    /// Around the world Y axis.
    pub total_y: f32,
}

impl GestureOffset {
    pub fn is_zero(&self) -> bool {
        self.total_x == 0.0 && self.total_y == 0.0
    }
}
