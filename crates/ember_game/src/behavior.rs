//! Enemy behavior strategy
//!
//! Enemy decision making sits behind a fixed input/output contract so the
//! implementation can be swapped (native state machine here, but a scripted
//! interpreter would satisfy the same trait) without touching the enemy.

use glam::{Quat, Vec3};
use std::time::Duration;

/// What the behavior sees each tick.
pub struct BehaviorInput {
    /// The enemy's world position.
    pub position: Vec3,
    /// The player's world position.
    pub target: Vec3,
    /// Time since the zone started.
    pub elapsed: Duration,
    /// The enemy's remaining health.
    pub health: f32,
}

/// What the behavior decides each tick.
pub struct BehaviorDecision {
    /// Walk direction (normalised, or zero to stand still).
    pub walk_direction: Vec3,
    /// Facing.
    pub orientation: Quat,
    /// Animation clip to play, if any.
    pub animation: Option<&'static str>,
    /// Whether to attack the player this tick.
    pub attack: bool,
}

/// A decision function driving an enemy.
pub trait Behavior {
    /// Decide movement, facing, animation, and attack for this tick.
    fn decide(&mut self, input: &BehaviorInput) -> BehaviorDecision;
}

const ATTACK_RANGE: f32 = 2.5;
const AGGRO_RANGE: f32 = 14.0;
const WAYPOINT_REACHED: f32 = 0.75;
const ATTACK_INTERVAL: Duration = Duration::from_millis(1200);

/// Patrols the corners of a bounding box, chases the player inside aggro
/// range, and attacks on an interval within melee range.
pub struct PatrolBehavior {
    bounds_min: Vec3,
    bounds_max: Vec3,
    waypoint: usize,
    next_attack: Duration,
    low_health_reported: bool,
}

impl PatrolBehavior {
    /// Create a patrol over the given bounds.
    pub fn new(bounds_min: Vec3, bounds_max: Vec3) -> Self {
        Self {
            bounds_min,
            bounds_max,
            waypoint: 0,
            next_attack: Duration::ZERO,
            low_health_reported: false,
        }
    }

    fn waypoint_position(&self, index: usize) -> Vec3 {
        let (min, max) = (self.bounds_min, self.bounds_max);
        match index % 4 {
            0 => Vec3::new(min.x, 0.0, min.z),
            1 => Vec3::new(max.x, 0.0, min.z),
            2 => Vec3::new(max.x, 0.0, max.z),
            _ => Vec3::new(min.x, 0.0, max.z),
        }
    }

    fn facing(direction: Vec3) -> Quat {
        Quat::from_rotation_y(direction.x.atan2(direction.z))
    }
}

impl Behavior for PatrolBehavior {
    fn decide(&mut self, input: &BehaviorInput) -> BehaviorDecision {
        if input.health < 30.0 && !self.low_health_reported {
            self.low_health_reported = true;
            log::debug!("enemy at {:?} is badly hurt", input.position);
        }

        let mut to_target = input.target - input.position;
        to_target.y = 0.0;
        let target_distance = to_target.length();

        if target_distance <= ATTACK_RANGE {
            // In melee range: stand, face the player, attack on the interval
            let attack = input.elapsed >= self.next_attack;
            if attack {
                self.next_attack = input.elapsed + ATTACK_INTERVAL;
            }
            return BehaviorDecision {
                walk_direction: Vec3::ZERO,
                orientation: Self::facing(to_target / target_distance.max(f32::EPSILON)),
                animation: Some(if attack { "Attack" } else { "Idle" }),
                attack,
            };
        }

        if target_distance <= AGGRO_RANGE {
            let direction = to_target / target_distance;
            return BehaviorDecision {
                walk_direction: direction,
                orientation: Self::facing(direction),
                animation: Some("Run"),
                attack: false,
            };
        }

        // Patrol the bounds corners
        let mut to_waypoint = self.waypoint_position(self.waypoint) - input.position;
        to_waypoint.y = 0.0;
        if to_waypoint.length() <= WAYPOINT_REACHED {
            self.waypoint += 1;
            to_waypoint = self.waypoint_position(self.waypoint) - input.position;
            to_waypoint.y = 0.0;
        }

        let direction = to_waypoint.normalize_or_zero();
        BehaviorDecision {
            walk_direction: direction,
            orientation: Self::facing(direction),
            animation: Some("Walk"),
            attack: false,
        }
    }
}
