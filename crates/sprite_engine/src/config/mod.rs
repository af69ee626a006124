//! Configuration system
//!
//! Configuration structs implement [`Config`] and can be read from or written
//! to `.toml` and `.ron` files.

use std::path::{Path, PathBuf};

pub use serde::{Deserialize, Serialize};

use crate::foundation::math::{Bounds, Vec2};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match extension(path) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Load configuration from file, falling back to defaults when the file is missing
    fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents)?;
        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory every asset alias is resolved against
    pub asset_root: PathBuf,

    /// Playfield rectangle; projectiles leaving it are culled
    pub playfield: Bounds,

    /// World-unit span visible through the main camera
    pub camera_frame: Vec2,

    /// Multiplier applied to the collision radius
    pub collision_scale: f32,

    /// Fixed tick length in seconds; `None` uses the wall clock
    pub fixed_timestep: Option<f32>,

    /// Update independent pools on scoped worker threads
    pub parallel_update: bool,

    /// Slot capacity reserved when a pool is created
    pub initial_pool_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            playfield: Bounds::centered(20.0, 20.0),
            camera_frame: Vec2::new(20.0, 20.0),
            collision_scale: 1.0,
            fixed_timestep: None,
            parallel_update: false,
            initial_pool_capacity: 20,
        }
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");

        let config = EngineConfig {
            collision_scale: 0.8,
            fixed_timestep: Some(1.0 / 60.0),
            parallel_update: true,
            ..EngineConfig::default()
        };
        config.save_to_file(&path).unwrap();

        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.ron");
        std::fs::write(&path, "(collision_scale: 2.0)").unwrap();

        let loaded = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded.collision_scale, 2.0);
        assert_eq!(loaded.initial_pool_capacity, EngineConfig::default().initial_pool_capacity);
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.ini");
        std::fs::write(&path, "").unwrap();

        assert!(matches!(
            EngineConfig::load_from_file(&path),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let loaded = EngineConfig::load_or_default("does/not/exist.toml").unwrap();
        assert_eq!(loaded, EngineConfig::default());
    }
}
