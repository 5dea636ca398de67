//! Zone descriptions
//!
//! A zone is a self-contained level: its own scene, physics world, and
//! object roster, rebuilt from scratch on every transition. Zone files are
//! TOML; the loader trait keeps the format behind a seam.
//!
//! ```toml
//! name = "forest"
//! player_start_position = [0.0, 1.5, 0.0]
//!
//! [[static_geometry]]
//! position = [0.0, -0.5, 0.0]
//! scale = [200.0, 1.0, 200.0]
//! mesh = "cube"
//! texture = "grass.png"
//!
//! [[enemies]]
//! position = [20.0, 1.5, 10.0]
//! bounds_min = [10.0, 0.0, 0.0]
//! bounds_max = [30.0, 0.0, 20.0]
//! mesh = "wolf.glb"
//!
//! [portal]
//! position = [50.0, 2.0, 0.0]
//! scale = [2.0, 4.0, 2.0]
//! destination = "ruins"
//! ```

use crate::error::GameError;
use glam::Vec3;
use serde::Deserialize;

fn default_orientation() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn default_scale() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_collision() -> bool {
    true
}

/// A piece of immovable zone geometry.
#[derive(Clone, Debug, Deserialize)]
pub struct StaticGeometry {
    pub position: [f32; 3],
    /// Quaternion, xyzw.
    #[serde(default = "default_orientation")]
    pub orientation: [f32; 4],
    #[serde(default = "default_scale")]
    pub scale: [f32; 3],
    /// "cube" or a mesh file name.
    pub mesh: String,
    #[serde(default)]
    pub texture: Option<String>,
    /// Whether a collision body backs this geometry.
    #[serde(default = "default_collision")]
    pub collision: bool,
}

/// Where and how an enemy spawns.
#[derive(Clone, Debug, Deserialize)]
pub struct EnemySpawn {
    pub position: [f32; 3],
    /// Patrol bounds.
    pub bounds_min: [f32; 3],
    pub bounds_max: [f32; 3],
    pub mesh: String,
    #[serde(default)]
    pub texture: Option<String>,
}

/// The zone's exit trigger volume.
#[derive(Clone, Debug, Deserialize)]
pub struct Portal {
    pub position: [f32; 3],
    pub scale: [f32; 3],
    /// Name of the zone this portal leads to.
    pub destination: String,
}

/// Provides everything needed to build one zone.
pub trait ZoneLoader {
    /// The zone's unique name.
    fn name(&self) -> &str;

    /// Where the player spawns.
    fn player_start_position(&self) -> Vec3;

    /// Immovable geometry descriptors.
    fn static_geometry(&self) -> &[StaticGeometry];

    /// Enemy spawn descriptors.
    fn enemies(&self) -> &[EnemySpawn];

    /// The zone's exit portal.
    fn portal(&self) -> &Portal;
}

#[derive(Debug, Deserialize)]
struct ZoneFile {
    name: String,
    player_start_position: [f32; 3],
    #[serde(default)]
    static_geometry: Vec<StaticGeometry>,
    #[serde(default)]
    enemies: Vec<EnemySpawn>,
    portal: Portal,
}

/// Zone loader backed by a TOML file.
pub struct TomlZoneLoader {
    file: ZoneFile,
}

impl TomlZoneLoader {
    /// Load a zone description from disk.
    pub fn from_path(path: &str) -> Result<Self, GameError> {
        let content = std::fs::read_to_string(path).map_err(|source| GameError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml(path, &content)
    }

    /// Parse a zone description; `label` names the source in diagnostics.
    pub fn from_toml(label: &str, content: &str) -> Result<Self, GameError> {
        let file: ZoneFile = toml::from_str(content).map_err(|source| GameError::Parse {
            path: label.to_string(),
            source,
        })?;
        log::debug!(
            "loaded zone '{}': {} static, {} enemies",
            file.name,
            file.static_geometry.len(),
            file.enemies.len()
        );
        Ok(Self { file })
    }
}

impl ZoneLoader for TomlZoneLoader {
    fn name(&self) -> &str {
        &self.file.name
    }

    fn player_start_position(&self) -> Vec3 {
        Vec3::from(self.file.player_start_position)
    }

    fn static_geometry(&self) -> &[StaticGeometry] {
        &self.file.static_geometry
    }

    fn enemies(&self) -> &[EnemySpawn] {
        &self.file.enemies
    }

    fn portal(&self) -> &Portal {
        &self.file.portal
    }
}
