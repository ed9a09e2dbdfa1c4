/// Renderer configuration.
///
/// Loaded from JSON; every field is optional and falls back to the defaults
/// below.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::math::Vec3;

/// How a face's light intensity is derived from `dot(normal, light)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lighting {
    /// `(dot + 1) / 2`
    Linear,
    /// `(50^((dot + 1) / 2) - 1) * 0.02`, darker shadows and a bright peak.
    Exponential,
}

impl Lighting {
    pub fn intensity(self, dot: f32) -> f32 {
        let half = (dot + 1.0) * 0.5;
        match self {
            Lighting::Linear => half,
            Lighting::Exponential => (50.0f32.powf(half) - 1.0) * 0.02,
        }
    }
}

/// Which camera controller drives the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraModel {
    Nudge,
    Physics,
}

impl std::str::FromStr for CameraModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nudge" => Ok(CameraModel::Nudge),
            "physics" => Ok(CameraModel::Physics),
            other => Err(ConfigError::Invalid(format!(
                "unknown camera model {:?} (expected nudge or physics)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Screen size in pixels (cells for the terminal host).
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub light_direction: [f32; 3],
    pub lighting: Lighting,
    pub camera_model: CameraModel,
    /// Turn the camera with pointer movement.
    pub mouse_look: bool,
    /// Mesh file; `None` renders the built-in cube.
    pub mesh_path: Option<PathBuf>,
    /// Where the model sits in the world.
    pub model_offset: [f32; 3],
    /// Spin about Y in radians per second.
    pub spin_speed: f32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 600,
            fov: 90.0,
            near: 0.1,
            far: 100.0,
            light_direction: [0.0, 1.0, 0.0],
            lighting: Lighting::Exponential,
            camera_model: CameraModel::Physics,
            mouse_look: true,
            mesh_path: None,
            model_offset: [0.0, 0.0, 10.0],
            spin_speed: 0.0,
        }
    }
}

impl RendererConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 2 || self.height < 2 {
            return Err(ConfigError::Invalid(format!(
                "screen {}x{} is too small",
                self.width, self.height
            )));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ConfigError::Invalid(format!(
                "clip range near={} far={} must satisfy 0 < near < far",
                self.near, self.far
            )));
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(ConfigError::Invalid(format!("fov {} out of (0, 180)", self.fov)));
        }
        if Vec3::from(self.light_direction).norm() == 0.0 {
            return Err(ConfigError::Invalid("light direction is zero".to_string()));
        }
        Ok(())
    }

    /// Height over width, as the projection expects it.
    pub fn aspect(&self) -> f32 {
        self.height as f32 / self.width as f32
    }

    pub fn light(&self) -> Vec3 {
        Vec3::from(self.light_direction).normalize()
    }

    pub fn offset(&self) -> Vec3 {
        Vec3::from(self.model_offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RendererConfig::default();
        assert_eq!(config.width, 600);
        assert!((config.aspect() - 1.0).abs() < 1e-6);
        assert!((config.light() - Vec3::new(0.0, 1.0, 0.0)).norm() < 1e-6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RendererConfig::from_json_str(
            r#"{ "width": 200, "height": 100, "lighting": "linear", "camera_model": "nudge" }"#,
        )
        .unwrap();
        assert_eq!(config.width, 200);
        assert_eq!(config.lighting, Lighting::Linear);
        assert_eq!(config.camera_model, CameraModel::Nudge);
        assert_eq!(config.fov, 90.0);
        assert!((config.aspect() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_clip_range() {
        let err = RendererConfig::from_json_str(r#"{ "near": 5.0, "far": 1.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(
            RendererConfig::from_json_str("{ width: }"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_camera_model_from_str() {
        assert_eq!("physics".parse::<CameraModel>().unwrap(), CameraModel::Physics);
        assert!("flying".parse::<CameraModel>().is_err());
    }

    #[test]
    fn test_lighting_ranges() {
        for model in [Lighting::Linear, Lighting::Exponential] {
            assert!(model.intensity(-1.0).abs() < 1e-6);
            let peak = model.intensity(1.0);
            assert!(peak > 0.9 && peak <= 1.0);
            assert!(model.intensity(0.0) < peak);
        }
        // Exponential is darker in the mid range.
        assert!(Lighting::Exponential.intensity(0.0) < Lighting::Linear.intensity(0.0));
    }
}
