//! # ember_physics - Physics Facade
//!
//! Narrow wrapper over Rapier 3D exposing only what the game consumes:
//!
//! - Fixed-timestep world stepping
//! - Static boxes (zone geometry), box sensors (portal, weapon volume),
//!   and character bodies (dynamic capsules with locked rotations)
//! - Contact and sensor-intersection queries for a single body
//! - Raycasts for camera occlusion
//!
//! The simulation internals stay behind this boundary; gameplay code only
//! ever sees [`ember_core::BodyHandle`] values and `glam` math.

mod error;
mod world;

pub use error::{PhysicsError, Result};
pub use world::{BodyKind, Contact, PhysicsWorld, RayHit};
