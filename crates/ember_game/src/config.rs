//! Game configuration
//!
//! One TOML file loaded at startup:
//!
//! ```toml
//! screen_width = 1280
//! screen_height = 720
//! graphics_api = "auto"        # vulkan, metal, dx12, gl, auto
//! physics_debug_draw = false
//! zone_files = ["zones/forest.toml", "zones/ruins.toml"]
//! starting_zone = "forest"
//! ```

use crate::error::GameError;
use serde::Deserialize;

fn default_graphics_api() -> String {
    "auto".to_string()
}

/// Startup configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct GameConfig {
    /// Window width in pixels.
    pub screen_width: u32,
    /// Window height in pixels.
    pub screen_height: u32,
    /// Graphics backend selector.
    #[serde(default = "default_graphics_api")]
    pub graphics_api: String,
    /// Log physics world contents when zones load.
    #[serde(default)]
    pub physics_debug_draw: bool,
    /// Zone description files to load, in order.
    pub zone_files: Vec<String>,
    /// Name of the zone the game starts in.
    pub starting_zone: String,
}

impl GameConfig {
    /// Load configuration from disk.
    pub fn load(path: &str) -> Result<Self, GameError> {
        let content = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml(path, &content)
    }

    /// Parse configuration; `label` names the source in diagnostics.
    pub fn from_toml(label: &str, content: &str) -> Result<Self, GameError> {
        toml::from_str(content).map_err(|source| GameError::Parse {
            path: label.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config = GameConfig::from_toml(
            "config.toml",
            r#"
                screen_width = 1280
                screen_height = 720
                zone_files = ["zones/forest.toml"]
                starting_zone = "forest"
            "#,
        )
        .unwrap();

        assert_eq!(config.screen_width, 1280);
        assert_eq!(config.graphics_api, "auto");
        assert!(!config.physics_debug_draw);
        assert_eq!(config.zone_files, ["zones/forest.toml"]);
    }

    #[test]
    fn test_missing_required_field_is_an_error() {
        let result = GameConfig::from_toml("config.toml", "screen_width = 1280");
        assert!(matches!(result, Err(GameError::Parse { .. })));
    }
}
