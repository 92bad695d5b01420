// error.rs — 配置与传感器错误

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("field of view bounds must satisfy 0 < min <= default <= max < 180 (got {min}/{default}/{max})")]
    InvalidFov { min: f32, default: f32, max: f32 },

    #[error("{name} must be finite and positive (got {value})")]
    InvalidSpeed { name: &'static str, value: f32 },

    #[error("unknown control method `{0}` (expected touch, motion or both)")]
    UnknownControlMethod(String),

    #[error("unknown projection `{0}` (expected cylindrical or spherical)")]
    UnknownProjection(String),

    #[error("missing value after `{0}`")]
    MissingValue(String),
}

/// Failures reported by a device-attitude source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SensorError {
    #[error("device attitude sensor is not available")]
    Unavailable,

    #[error("attitude read failed: {0}")]
    ReadFailed(String),
}
