// config.rs — 查看器配置
//
// 加载顺序：
// - 显式路径：--config <path> 或环境变量 PANORAMA_CONFIG（不存在即报错）
// - 否则搜索 <exe_dir>/panorama.json、./panorama.json（找不到用默认值）
// - 再叠加命令行：--control / --projection / --lang / 图片路径
//
// 配置文件里的角度单位为度。

use log::info;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::panorama::{ControlMethod, PanoramaSettings, ProjectionMode};

pub const CONFIG_FILE: &str = "panorama.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    #[default]
    Virtual,
    None,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub image: Option<PathBuf>,
    pub lang: Option<String>,
    pub control_method: ControlMethod,
    pub projection: Option<ProjectionMode>,
    pub pan_speed: [f32; 2],
    pub pinch_speed: f32,
    pub min_fov: f32,
    pub default_fov: f32,
    pub max_fov: f32,
    pub start_angle: f32,
    pub angle_offset: f32,
    pub sample_interval_ms: u64,
    pub sensor: SensorKind,
    pub overlay_text: Option<String>,
    pub show_compass: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let s = PanoramaSettings::default();
        Self {
            image: None,
            lang: None,
            control_method: ControlMethod::Touch,
            projection: None,
            pan_speed: s.pan_speed,
            pinch_speed: s.pinch_speed,
            min_fov: s.min_fov,
            default_fov: s.default_fov,
            max_fov: s.max_fov,
            start_angle: s.start_angle.to_degrees(),
            angle_offset: s.angle_offset.to_degrees(),
            sample_interval_ms: 15,
            sensor: SensorKind::Virtual,
            overlay_text: None,
            show_compass: true,
        }
    }
}

impl ViewerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Full layering from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let explicit = std::env::var_os("PANORAMA_CONFIG").map(PathBuf::from);
        Self::load_from(&args, explicit)
    }

    pub fn load_from(args: &[String], env_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let explicit = match flag_value(args, "--config")? {
            Some(p) => Some(PathBuf::from(p)),
            None => env_path,
        };

        let mut config = match explicit.or_else(|| locate(Path::new(CONFIG_FILE))) {
            Some(path) => {
                info!("config: {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };

        config.apply_args(args)?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_args(&mut self, args: &[String]) -> Result<(), ConfigError> {
        let mut it = args.iter();
        while let Some(a) = it.next() {
            let mut value = || it.next().cloned().ok_or_else(|| ConfigError::MissingValue(a.clone()));
            match a.as_str() {
                "--config" => {
                    value()?;
                }
                "--control" => self.control_method = value()?.parse()?,
                "--projection" => self.projection = Some(value()?.parse()?),
                "--lang" => self.lang = Some(value()?),
                other if !other.starts_with("--") => self.image = Some(PathBuf::from(other)),
                _ => {}
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fov_ok = self.min_fov > 0.0
            && self.min_fov <= self.default_fov
            && self.default_fov <= self.max_fov
            && self.max_fov < 180.0;
        if !fov_ok {
            return Err(ConfigError::InvalidFov {
                min: self.min_fov,
                default: self.default_fov,
                max: self.max_fov,
            });
        }

        let speeds = [
            ("pan_speed.x", self.pan_speed[0]),
            ("pan_speed.y", self.pan_speed[1]),
            ("pinch_speed", self.pinch_speed),
        ];
        for (name, value) in speeds {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidSpeed { name, value });
            }
        }
        Ok(())
    }

    pub fn settings(&self) -> PanoramaSettings {
        PanoramaSettings {
            pan_speed: self.pan_speed,
            pinch_speed: self.pinch_speed,
            min_fov: self.min_fov,
            default_fov: self.default_fov,
            max_fov: self.max_fov,
            start_angle: self.start_angle.to_radians(),
            angle_offset: self.angle_offset.to_radians(),
            ..PanoramaSettings::default()
        }
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }
}

fn flag_value(args: &[String], flag: &str) -> Result<Option<String>, ConfigError> {
    match args.iter().position(|a| a == flag) {
        Some(i) => args
            .get(i + 1)
            .cloned()
            .map(Some)
            .ok_or_else(|| ConfigError::MissingValue(flag.to_string())),
        None => Ok(None),
    }
}

/// Finds `relative` next to the executable first, then in the working
/// directory.
pub fn locate(relative: &Path) -> Option<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            let p = dir.join(relative);
            if p.exists() {
                return Some(p);
            }
        }
    }

    let p = relative.to_path_buf();
    if p.exists() {
        return Some(p);
    }

    None
}
