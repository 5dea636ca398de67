//! Error types for the physics facade

use ember_core::BodyHandle;
use thiserror::Error;

/// Physics facade errors
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Rigid body not found
    #[error("rigid body not found: {0:?}")]
    BodyNotFound(BodyHandle),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
