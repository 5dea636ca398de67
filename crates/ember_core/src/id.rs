//! Identifiers shared across the workspace

use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a gameplay entity.
///
/// Allocated once per object and carried in messages so receivers can tally
/// events (e.g. which enemy was killed) without holding a reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityId(u64);

static NEXT_ENTITY_ID: AtomicU64 = AtomicU64::new(1);

impl EntityId {
    /// Allocate a fresh id.
    pub fn next() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value, for logging.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Opaque reference to a rigid body owned by the physics world.
///
/// The physics crate mints these and resolves them back internally; gameplay
/// code only compares and forwards them (collision message payloads).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_ids_unique() {
        let a = EntityId::next();
        let b = EntityId::next();
        assert_ne!(a, b);
    }
}
