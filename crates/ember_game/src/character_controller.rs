//! Character movement with a temporary shunt override
//!
//! Two states: **Normal** (movement intent is applied directly) and
//! **Shunted** (an involuntary move - knockback - overrides intent until a
//! deadline passes). While shunted, external direction changes are buffered
//! and restored when the shunt expires; a shunt cannot be re-triggered while
//! one is active.

use ember_core::{BodyHandle, Clock, GameTime};
use ember_physics::PhysicsWorld;
use glam::Vec3;
use std::rc::Rc;
use std::time::Duration;

const CAPSULE_HALF_HEIGHT: f32 = 0.6;
const CAPSULE_RADIUS: f32 = 0.5;

/// Drives a physics character body from a movement direction and speed.
pub struct CharacterController {
    body: BodyHandle,
    clock: Rc<dyn Clock>,
    speed: f32,
    movement_direction: Vec3,
    is_being_shunted: bool,
    shunt_end: GameTime,
    saved_movement_direction: Vec3,
    saved_speed: f32,
    position: Vec3,
}

impl CharacterController {
    /// Create a controller and its capsule body at `position`.
    pub fn new(
        physics: &mut PhysicsWorld,
        clock: Rc<dyn Clock>,
        position: Vec3,
        speed: f32,
    ) -> Self {
        let body = physics.add_character(position, CAPSULE_HALF_HEIGHT, CAPSULE_RADIUS);
        Self {
            body,
            clock,
            speed,
            movement_direction: Vec3::ZERO,
            is_being_shunted: false,
            shunt_end: GameTime::ZERO,
            saved_movement_direction: Vec3::ZERO,
            saved_speed: 0.0,
            position,
        }
    }

    /// The underlying physics body.
    pub fn body(&self) -> BodyHandle {
        self.body
    }

    /// Last integrated world position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Whether a shunt is currently overriding movement.
    pub fn is_being_shunted(&self) -> bool {
        self.is_being_shunted
    }

    /// Current movement direction (the shunt direction while shunted).
    pub fn movement_direction(&self) -> Vec3 {
        self.movement_direction
    }

    /// Set the walk direction. Should be a normalised vector. While shunted
    /// the direction is buffered and applied when the shunt expires.
    pub fn set_movement_direction(&mut self, direction: Vec3) {
        if !self.is_being_shunted {
            self.movement_direction = direction;
        } else {
            self.saved_movement_direction = direction;
        }
    }

    /// Shunt the character: move it `distance` along `direction` over
    /// `duration`, ignoring movement intent until done. Ignored if a shunt
    /// is already active - the first shunt wins.
    pub fn shunt(&mut self, direction: Vec3, distance: f32, duration: Duration) {
        if self.is_being_shunted {
            return;
        }

        self.saved_movement_direction = self.movement_direction;
        self.saved_speed = self.speed;

        self.movement_direction = direction;
        self.speed = distance / duration.as_secs_f32();
        self.shunt_end = self.clock.now() + duration;
        self.is_being_shunted = true;
    }

    /// Drive the body and settle shunt state. The body has already been
    /// integrated by the zone's physics step when this runs; the velocity
    /// set here takes effect on the next step.
    pub fn update(&mut self, physics: &mut PhysicsWorld) {
        if let Ok(position) = physics.body_position(self.body) {
            self.position = position;
        }

        // Preserve vertical velocity so gravity keeps acting
        let vertical = physics
            .linear_velocity(self.body)
            .map(|velocity| velocity.y)
            .unwrap_or(0.0);
        let velocity = Vec3::new(
            self.movement_direction.x * self.speed,
            vertical,
            self.movement_direction.z * self.speed,
        );
        if let Err(error) = physics.set_linear_velocity(self.body, velocity) {
            log::warn!("character body missing: {error}");
        }

        if self.is_being_shunted && self.clock.now() > self.shunt_end {
            self.movement_direction = self.saved_movement_direction;
            self.speed = self.saved_speed;
            self.is_being_shunted = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ember_core::ManualClock;

    fn fixture() -> (PhysicsWorld, Rc<ManualClock>, CharacterController) {
        let mut physics = PhysicsWorld::with_gravity(Vec3::ZERO);
        let clock = Rc::new(ManualClock::new());
        let controller =
            CharacterController::new(&mut physics, clock.clone(), Vec3::ZERO, 10.0);
        (physics, clock, controller)
    }

    #[test]
    fn test_movement_direction_applied_when_normal() {
        let (mut physics, _clock, mut controller) = fixture();

        controller.set_movement_direction(Vec3::X);
        controller.update(&mut physics);

        assert_eq!(controller.movement_direction(), Vec3::X);
        let velocity = physics.linear_velocity(controller.body()).unwrap();
        assert_relative_eq!(velocity.x, 10.0);
    }

    #[test]
    fn test_shunt_overrides_and_buffers_direction() {
        let (mut physics, _clock, mut controller) = fixture();

        controller.set_movement_direction(Vec3::X);
        controller.shunt(Vec3::Z, 4.0, Duration::from_millis(250));

        assert!(controller.is_being_shunted());
        assert_eq!(controller.movement_direction(), Vec3::Z);

        // Buffered, not applied
        controller.set_movement_direction(Vec3::NEG_X);
        assert_eq!(controller.movement_direction(), Vec3::Z);

        // Shunt covers distance/duration
        controller.update(&mut physics);
        let velocity = physics.linear_velocity(controller.body()).unwrap();
        assert_relative_eq!(velocity.z, 16.0);
    }

    #[test]
    fn test_second_shunt_ignored_while_active() {
        let (mut physics, clock, mut controller) = fixture();

        controller.set_movement_direction(Vec3::X);
        controller.shunt(Vec3::Z, 4.0, Duration::from_millis(250));
        let direction = controller.movement_direction();

        controller.shunt(Vec3::NEG_Z, 100.0, Duration::from_millis(900));
        assert_eq!(controller.movement_direction(), direction);

        // The original deadline still applies: not yet expired at 250ms...
        clock.set(GameTime::from_secs_f64(0.25));
        controller.update(&mut physics);
        assert!(controller.is_being_shunted());

        // ...and expired just after, well before the second shunt's 900ms
        clock.set(GameTime::from_secs_f64(0.26));
        controller.update(&mut physics);
        assert!(!controller.is_being_shunted());
    }

    #[test]
    fn test_shunt_expiry_restores_saved_state() {
        let (mut physics, clock, mut controller) = fixture();

        controller.set_movement_direction(Vec3::X);
        controller.shunt(Vec3::Z, 4.0, Duration::from_millis(250));
        controller.set_movement_direction(Vec3::NEG_X);

        // Still shunted just before the deadline
        clock.set(GameTime::from_secs_f64(0.249));
        controller.update(&mut physics);
        assert!(controller.is_being_shunted());

        // Restored just after; the buffered direction wins
        clock.set(GameTime::from_secs_f64(0.251));
        controller.update(&mut physics);
        assert!(!controller.is_being_shunted());
        assert_eq!(controller.movement_direction(), Vec3::NEG_X);

        controller.update(&mut physics);
        let velocity = physics.linear_velocity(controller.body()).unwrap();
        assert_relative_eq!(velocity.x, -10.0);
    }
}
