//! Message kinds and payloads
//!
//! Each message carries a statically known payload; subscribers match on the
//! variant instead of casting an opaque value.

use crate::input::{KeyboardInput, MouseButtonInput, MouseMotion, MouseScroll};
use ember_core::{BodyHandle, EntityId};
use glam::Vec3;

/// The closed set of message kinds. Subscriptions are keyed by kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageType {
    Quit,
    MouseMove,
    MouseButtonPress,
    KeyPress,
    ScrollWheel,
    WeaponCollision,
    EnemyAttack,
    PlayerHealthChange,
    KilledEnemy,
    LevelProgress,
    ObjectCollision,
    QuestComplete,
    PlayerDied,
}

/// A message and its payload, one variant per [`MessageType`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Message {
    /// Shut the game down.
    Quit,
    /// Relative mouse movement.
    MouseMove(MouseMotion),
    /// Mouse button press/release.
    MouseButtonPress(MouseButtonInput),
    /// Key press/release.
    KeyPress(KeyboardInput),
    /// Scroll wheel movement.
    ScrollWheel(MouseScroll),
    /// The player's weapon volume is touching `body`; `position` is the
    /// world position of the weapon volume at contact time.
    WeaponCollision { body: BodyHandle, position: Vec3 },
    /// An enemy landed an attack on the player.
    EnemyAttack,
    /// The player's remaining health changed.
    PlayerHealthChange { health: f32 },
    /// An enemy died.
    KilledEnemy { enemy: EntityId },
    /// Progress towards the next level, in [0, 1).
    LevelProgress { progress: f32 },
    /// The player's own body is touching `body`.
    ObjectCollision { body: BodyHandle, position: Vec3 },
    /// A quest completed, awarding `xp`.
    QuestComplete { xp: u32 },
    /// The player's health dropped to zero.
    PlayerDied,
}

impl Message {
    /// The kind this message is delivered under.
    pub fn kind(&self) -> MessageType {
        match self {
            Message::Quit => MessageType::Quit,
            Message::MouseMove(_) => MessageType::MouseMove,
            Message::MouseButtonPress(_) => MessageType::MouseButtonPress,
            Message::KeyPress(_) => MessageType::KeyPress,
            Message::ScrollWheel(_) => MessageType::ScrollWheel,
            Message::WeaponCollision { .. } => MessageType::WeaponCollision,
            Message::EnemyAttack => MessageType::EnemyAttack,
            Message::PlayerHealthChange { .. } => MessageType::PlayerHealthChange,
            Message::KilledEnemy { .. } => MessageType::KilledEnemy,
            Message::LevelProgress { .. } => MessageType::LevelProgress,
            Message::ObjectCollision { .. } => MessageType::ObjectCollision,
            Message::QuestComplete { .. } => MessageType::QuestComplete,
            Message::PlayerDied => MessageType::PlayerDied,
        }
    }
}
