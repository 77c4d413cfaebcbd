//! Shared types and configuration for the stereo viewer.

pub mod config;
pub mod types;

pub use config::{
    CameraConfig, ConfigError, LightConfig, ProjectionConfig, SceneConfig, StereoConfig,
    WindowConfig,
};
pub use types::{CameraMovement, Eye, EyeSide};
