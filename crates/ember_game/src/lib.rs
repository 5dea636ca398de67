//! # ember_game - Gameplay Core
//!
//! The stateful game objects of the Emberwood client and the session
//! orchestration tying them together. Objects never hold direct references
//! to the systems they influence; they coordinate through the message bus
//! ([`ember_event`]) while a single fixed-order frame loop drives updates.

mod behavior;
mod camera;
mod character_controller;
mod config;
mod enemy;
mod error;
mod game;
mod hud;
mod input;
mod object;
mod player;
mod quest;
mod zone;

pub use behavior::{Behavior, BehaviorDecision, BehaviorInput, PatrolBehavior};
pub use camera::{CameraView, ThirdPersonCamera};
pub use character_controller::CharacterController;
pub use config::GameConfig;
pub use enemy::Enemy;
pub use error::GameError;
pub use game::{Game, GameHost, GameState};
pub use hud::Hud;
pub use input::{EventQueue, InputHandler};
pub use object::{GameObject, UpdateContext};
pub use player::Player;
pub use quest::{KillEnemyQuest, Quest, QuestManager};
pub use zone::{EnemySpawn, Portal, StaticGeometry, TomlZoneLoader, ZoneLoader};
