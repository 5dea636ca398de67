//! Game object contract

use ember_physics::PhysicsWorld;
use ember_scene::Scene;
use std::time::Duration;

/// Per-frame state handed to every game object in update order.
pub struct UpdateContext<'a> {
    /// The zone's physics world.
    pub physics: &'a mut PhysicsWorld,
    /// The zone's scene.
    pub scene: &'a mut Scene,
    /// Time since the previous frame.
    pub delta: Duration,
    /// Time since the zone started.
    pub elapsed: Duration,
}

/// Anything the zone updates once per frame, in registration order.
///
/// Objects that react to messages additionally implement
/// [`ember_event::Subscriber`]; objects that emit hold an
/// [`ember_event::Publisher`]. Both capabilities are composed in, not
/// inherited.
pub trait GameObject {
    /// Advance the object by one frame.
    fn update(&mut self, ctx: &mut UpdateContext<'_>);
}
