//! Configuration system
//!
//! Serializable settings for the HUD core, loadable from TOML or RON
//! files. Everything has sensible defaults so embedders can start from
//! `HudConfig::default()` and persist only what they change.

use serde::{Deserialize, Serialize};

/// Configuration trait for loadable/savable settings types
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
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

/// Cursor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorConfig {
    /// Whether the cursor starts visible
    pub visible: bool,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self { visible: true }
    }
}

/// Coordinate-space settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceConfig {
    /// Whether camera-anchored planes apply the resolution scale
    pub use_resolution_scale: bool,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            use_resolution_scale: false,
        }
    }
}

/// Top-level HUD core settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HudConfig {
    /// Cursor settings
    pub cursor: CursorConfig,
    /// Coordinate-space settings
    pub space: SpaceConfig,
}

impl Config for HudConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HudConfig::default();
        assert!(config.cursor.visible);
        assert!(!config.space.use_resolution_scale);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = HudConfig {
            cursor: CursorConfig { visible: false },
            ..Default::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: HudConfig = toml::from_str(&text).unwrap();
        assert!(!parsed.cursor.visible);
    }
}
