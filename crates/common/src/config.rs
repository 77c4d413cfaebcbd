//! Viewer configuration loaded from YAML.
//!
//! Every field has a default, so an empty file (or no file) yields the
//! stock scene: an 800x600-per-eye window, one model placement and the
//! blue skybox.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors from loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Skybox face file names in cube layer order (+X, -X, +Y, -Y, +Z, -Z).
pub const SKYBOX_FACES: [&str; 6] = [
    "right.png",
    "left.png",
    "top.png",
    "bottom.png",
    "front.png",
    "back.png",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    /// Width of one eye's viewport. The window is twice as wide.
    pub eye_width: u32,
    pub height: u32,
    pub vsync: bool,
    pub capture_cursor: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "stereo stuff".into(),
            eye_width: 800,
            height: 600,
            vsync: false,
            capture_cursor: true,
        }
    }
}

impl WindowConfig {
    /// Full window size; saturates on an eye width that `validate` rejects.
    pub fn window_size(&self) -> (u32, u32) {
        (self.eye_width.saturating_mul(2), self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    pub yaw_degrees: f32,
    pub pitch_degrees: f32,
    pub speed: f32,
    pub sensitivity: f32,
    pub zoom: f32,
    pub zoom_min: f32,
    pub zoom_max: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 3.0),
            yaw_degrees: -90.0,
            pitch_degrees: 0.0,
            speed: 2.5,
            sensitivity: 0.1,
            zoom: 45.0,
            zoom_min: 1.0,
            zoom_max: 45.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    pub near: f32,
    pub far: f32,
    /// Half the inter-eye distance; each eye sits this far from the camera.
    pub half_separation: f32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            near: 0.5,
            far: 100.0,
            half_separation: 0.0325,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            ambient: Vec3::splat(0.5),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::splat(0.5),
            shininess: 64.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub model: PathBuf,
    pub skybox_dir: PathBuf,
    /// One model instance is drawn at each of these offsets.
    pub placements: Vec<Vec3>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("resources/fishy/fish.obj"),
            skybox_dir: PathBuf::from("resources/blue"),
            placements: vec![Vec3::new(1.0, 1.0, -7.0)],
        }
    }
}

impl SceneConfig {
    /// Full paths of the six skybox faces in cube layer order.
    pub fn skybox_faces(&self) -> [PathBuf; 6] {
        SKYBOX_FACES.map(|face| self.skybox_dir.join(face))
    }
}

/// Top-level viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StereoConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub projection: ProjectionConfig,
    pub light: LightConfig,
    pub scene: SceneConfig,
    /// Re-allocate the per-eye render targets when the window is resized.
    /// When false the targets keep their creation size and are stretched.
    pub reallocate_on_resize: bool,
    pub show_hud: bool,
}

impl Default for StereoConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            projection: ProjectionConfig::default(),
            light: LightConfig::default(),
            scene: SceneConfig::default(),
            reallocate_on_resize: true,
            show_hud: false,
        }
    }
}

impl StereoConfig {
    /// Parse a YAML document. Missing fields take their defaults.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Reject values that would produce a degenerate frustum or an empty window.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.projection;
        if !p.near.is_finite() || p.near <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "near plane must be positive, got {}",
                p.near
            )));
        }
        if !p.far.is_finite() || p.far <= p.near {
            return Err(ConfigError::Invalid(format!(
                "far plane ({}) must exceed near plane ({})",
                p.far, p.near
            )));
        }
        if !p.half_separation.is_finite() || p.half_separation < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "half separation must be non-negative, got {}",
                p.half_separation
            )));
        }

        let c = &self.camera;
        let zoom_ok = c.zoom_min > 0.0 && c.zoom_max < 180.0 && c.zoom_min <= c.zoom_max;
        if !zoom_ok {
            return Err(ConfigError::Invalid(format!(
                "zoom range [{}, {}] must lie inside (0, 180) degrees",
                c.zoom_min, c.zoom_max
            )));
        }

        if self.window.eye_width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid("window dimensions must be non-zero".into()));
        }
        if self.window.eye_width.checked_mul(2).is_none() {
            return Err(ConfigError::Invalid(format!(
                "eye width {} overflows the window width",
                self.window.eye_width
            )));
        }
        Ok(())
    }
}
