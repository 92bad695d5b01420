// panorama.rs — 投影模式、控制方式与视角参数

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionMode {
    Cylindrical, // 圆柱：只允许水平转动 (yaw)
    Spherical,   // 球面：自由视角，四元数表示
}

impl ProjectionMode {
    /// Picks the projection for an image of the given pixel size.
    ///
    /// Exactly 2:1 images are equirectangular and go on a sphere; every other
    /// ratio, a degenerate size or no image at all falls back to a tube.
    pub fn for_image_size(size: Option<(u32, u32)>) -> Self {
        match size {
            Some((w, h)) if h > 0 && w as f64 / h as f64 == 2.0 => ProjectionMode::Spherical,
            _ => ProjectionMode::Cylindrical,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ProjectionMode::Cylindrical => ProjectionMode::Spherical,
            ProjectionMode::Spherical => ProjectionMode::Cylindrical,
        }
    }
}

impl fmt::Display for ProjectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProjectionMode::Cylindrical => "cylindrical",
            ProjectionMode::Spherical => "spherical",
        })
    }
}

impl FromStr for ProjectionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cylindrical" | "cylinder" | "tube" => Ok(ProjectionMode::Cylindrical),
            "spherical" | "sphere" => Ok(ProjectionMode::Spherical),
            _ => Err(ConfigError::UnknownProjection(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMethod {
    Touch,
    Motion,
    /// Sensor attitude with finger offsets layered on top.
    #[serde(rename = "both", alias = "combined", alias = "combo")]
    Combined,
}

impl ControlMethod {
    pub fn uses_gestures(self) -> bool {
        matches!(self, ControlMethod::Touch | ControlMethod::Combined)
    }

    pub fn uses_motion(self) -> bool {
        matches!(self, ControlMethod::Motion | ControlMethod::Combined)
    }
}

impl fmt::Display for ControlMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ControlMethod::Touch => "touch",
            ControlMethod::Motion => "motion",
            ControlMethod::Combined => "both",
        })
    }
}

impl FromStr for ControlMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "touch" => Ok(ControlMethod::Touch),
            "motion" => Ok(ControlMethod::Motion),
            "both" | "combined" | "combo" => Ok(ControlMethod::Combined),
            _ => Err(ConfigError::UnknownControlMethod(s.to_string())),
        }
    }
}

/// Tunables of the panorama widget. Angles are radians, FOV values degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanoramaSettings {
    /// Fraction of a full turn per viewport width (x) / half turn per height (y).
    pub pan_speed: [f32; 2],
    pub pinch_speed: f32,
    pub min_fov: f32,
    pub default_fov: f32,
    pub max_fov: f32,
    pub start_angle: f32,
    /// Static rotation of the sphere/tube around the vertical axis.
    pub angle_offset: f32,
    /// Pitch limit applied after touch pans.
    pub pitch_limit: f32,
}

impl Default for PanoramaSettings {
    fn default() -> Self {
        Self {
            pan_speed: [0.4, 0.4],
            pinch_speed: 1.0,
            min_fov: 20.0,
            default_fov: 70.0,
            max_fov: 100.0,
            start_angle: 0.0,
            angle_offset: 0.0,
            pitch_limit: 1.1,
        }
    }
}

impl PanoramaSettings {
    pub fn clamp_fov(&self, fov: f32) -> f32 {
        fov.clamp(self.min_fov, self.max_fov)
    }

    /// Yaw and pitch (radians) produced by a screen-space drag.
    pub fn pan_angles(&self, dx: f32, dy: f32, width: f32, height: f32) -> (f32, f32) {
        let yaw = dx * self.pan_speed[0] / width * 2.0 * PI;
        let pitch = dy * self.pan_speed[1] / height * PI;
        (yaw, pitch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_to_one_images_are_spherical() {
        assert_eq!(ProjectionMode::for_image_size(Some((100, 50))), ProjectionMode::Spherical);
        assert_eq!(ProjectionMode::for_image_size(Some((8192, 4096))), ProjectionMode::Spherical);
    }

    #[test]
    fn other_ratios_are_cylindrical() {
        assert_eq!(ProjectionMode::for_image_size(Some((200, 50))), ProjectionMode::Cylindrical);
        assert_eq!(ProjectionMode::for_image_size(Some((101, 50))), ProjectionMode::Cylindrical);
        assert_eq!(ProjectionMode::for_image_size(Some((100, 0))), ProjectionMode::Cylindrical);
        assert_eq!(ProjectionMode::for_image_size(None), ProjectionMode::Cylindrical);
    }

    #[test]
    fn control_method_names() {
        assert_eq!("touch".parse::<ControlMethod>().unwrap(), ControlMethod::Touch);
        assert_eq!("Motion".parse::<ControlMethod>().unwrap(), ControlMethod::Motion);
        assert_eq!("both".parse::<ControlMethod>().unwrap(), ControlMethod::Combined);
        assert_eq!("combo".parse::<ControlMethod>().unwrap(), ControlMethod::Combined);
        assert!("gyro".parse::<ControlMethod>().is_err());
        assert_eq!(ControlMethod::Combined.to_string(), "both");
    }

    #[test]
    fn control_method_sources() {
        assert!(ControlMethod::Touch.uses_gestures());
        assert!(!ControlMethod::Touch.uses_motion());
        assert!(!ControlMethod::Motion.uses_gestures());
        assert!(ControlMethod::Combined.uses_gestures() && ControlMethod::Combined.uses_motion());
    }

    #[test]
    fn pan_angles_scale_with_viewport() {
        let settings = PanoramaSettings::default();
        let (yaw, pitch) = settings.pan_angles(100.0, 0.0, 400.0, 300.0);
        assert!((yaw - 100.0 * 0.4 / 400.0 * 2.0 * PI).abs() < 1e-6);
        assert_eq!(pitch, 0.0);
    }
}
