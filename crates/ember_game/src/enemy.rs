//! AI-driven combatant
//!
//! An enemy is **Alive** until its health reaches zero, then **Dead**
//! forever: no script updates, no attacks, position frozen. While alive a
//! [`Behavior`](crate::behavior::Behavior) decides movement, facing,
//! animation, and attacks each tick; weapon hits land here, debounced by a
//! fixed cooldown, and shove the enemy away from the blow.

use crate::behavior::{Behavior, BehaviorInput};
use crate::camera::ThirdPersonCamera;
use crate::character_controller::CharacterController;
use crate::object::{GameObject, UpdateContext};
use crate::player::Player;
use ember_core::{BodyHandle, Clock, EntityId, GameTime};
use ember_event::{Message, Publisher, Subscriber};
use ember_physics::PhysicsWorld;
use ember_scene::{EntityHandle, MeshRef, Scene, SceneEntity};
use glam::{Quat, Vec3};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

const WALK_SPEED: f32 = 6.0;
const STARTING_HEALTH: f32 = 100.0;
const HIT_DAMAGE: f32 = 25.0;
const HIT_COOLDOWN: Duration = Duration::from_millis(500);
const KNOCKBACK_DISTANCE: f32 = 4.0;
const KNOCKBACK_DURATION: Duration = Duration::from_millis(250);

const HEALTH_BAR_WIDTH: f32 = 1.5;
const HEALTH_BAR_OFFSET: Vec3 = Vec3::new(0.0, 2.2, 0.0);
const MODEL_OFFSET: Vec3 = Vec3::new(0.0, -1.1, 0.0);

pub struct Enemy {
    id: EntityId,
    controller: CharacterController,
    entity: EntityHandle,
    health_bar: EntityHandle,
    behavior: Box<dyn Behavior>,
    publisher: Publisher,
    clock: Rc<dyn Clock>,
    player: Rc<RefCell<Player>>,
    camera: Rc<RefCell<ThirdPersonCamera>>,
    health: f32,
    is_dead: bool,
    frozen: bool,
    hit_cooldown: GameTime,
    orientation: Quat,
}

impl Enemy {
    /// Spawn an enemy at `position` with its render entity and billboard
    /// health bar.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        physics: &mut PhysicsWorld,
        scene: &mut Scene,
        clock: Rc<dyn Clock>,
        publisher: Publisher,
        player: Rc<RefCell<Player>>,
        camera: Rc<RefCell<ThirdPersonCamera>>,
        behavior: Box<dyn Behavior>,
        position: Vec3,
        mesh: &str,
        texture: Option<&str>,
    ) -> Self {
        let controller = CharacterController::new(physics, clock.clone(), position, WALK_SPEED);

        let mut entity = SceneEntity::new(MeshRef::File(mesh.to_string()))
            .with_position(position + MODEL_OFFSET)
            .with_animation("Walk");
        if let Some(texture) = texture {
            entity = entity.with_texture(texture);
        }
        let entity = scene.add(entity);

        let health_bar = scene.add(
            SceneEntity::new(MeshRef::Sprite)
                .with_position(position + HEALTH_BAR_OFFSET)
                .with_scale(Vec3::new(HEALTH_BAR_WIDTH, 0.1, 1.0))
                .with_texture("health_bar.png"),
        );

        Self {
            id: EntityId::next(),
            controller,
            entity,
            health_bar,
            behavior,
            publisher,
            clock,
            player,
            camera,
            health: STARTING_HEALTH,
            is_dead: false,
            frozen: false,
            hit_cooldown: GameTime::ZERO,
            orientation: Quat::IDENTITY,
        }
    }

    /// This enemy's id, as carried in KilledEnemy messages.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The enemy's physics body.
    pub fn body(&self) -> BodyHandle {
        self.controller.body()
    }

    /// Remaining health.
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Whether the enemy has died.
    pub fn is_dead(&self) -> bool {
        self.is_dead
    }
}

impl GameObject for Enemy {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if self.is_dead {
            // Settle the corpse once: kill any leftover knockback velocity
            // and retire the health bar
            if !self.frozen {
                self.frozen = true;
                if let Err(error) =
                    ctx.physics.set_linear_velocity(self.controller.body(), Vec3::ZERO)
                {
                    log::warn!("dead enemy body missing: {error}");
                }
                ctx.scene.entity_mut(self.health_bar).visible = false;
                ctx.scene.entity_mut(self.entity).animation.play("Death");
            }
            return;
        }

        let position = self.controller.position();
        let target = self.player.borrow().position();

        let decision = self.behavior.decide(&BehaviorInput {
            position,
            target,
            elapsed: ctx.elapsed,
            health: self.health,
        });

        self.controller.set_movement_direction(decision.walk_direction);
        self.orientation = decision.orientation;
        if decision.attack {
            log::debug!("enemy {} attacks", self.id.raw());
            self.publisher.publish(Message::EnemyAttack);
        }

        self.controller.update(ctx.physics);
        let position = self.controller.position();

        let entity = ctx.scene.entity_mut(self.entity);
        entity.position = position + MODEL_OFFSET;
        entity.orientation = self.orientation;
        if let Some(clip) = decision.animation {
            entity.animation.play(clip);
        }
        entity.animation.advance(ctx.delta.as_secs_f32());

        // Billboard health bar: above the head, facing the camera, scaled
        // by the remaining health fraction
        let camera_position = self.camera.borrow().position();
        let to_camera = camera_position - position;
        let bar = ctx.scene.entity_mut(self.health_bar);
        bar.position = position + HEALTH_BAR_OFFSET;
        bar.orientation = Quat::from_rotation_y(to_camera.x.atan2(to_camera.z));
        bar.scale = Vec3::new(
            HEALTH_BAR_WIDTH * (self.health / STARTING_HEALTH),
            0.1,
            1.0,
        );
    }
}

impl Subscriber for Enemy {
    fn handle_message(&mut self, message: &Message) {
        let Message::WeaponCollision { body, position } = message else {
            return;
        };
        if *body != self.controller.body() || self.is_dead {
            return;
        }

        let now = self.clock.now();
        if now < self.hit_cooldown {
            // Repeat contact from the same swing; ignore
            return;
        }

        log::debug!("enemy {} hit at {:?}", self.id.raw(), position);

        let mut away = self.controller.position() - *position;
        away.y = 0.0;
        let away = away.try_normalize().unwrap_or(Vec3::Z);
        self.controller
            .shunt(away, KNOCKBACK_DISTANCE, KNOCKBACK_DURATION);

        self.health -= HIT_DAMAGE;
        self.hit_cooldown = now + HIT_COOLDOWN;

        if self.health <= 0.0 {
            self.health = 0.0;
            self.is_dead = true;
            log::info!("enemy {} died", self.id.raw());
            self.publisher.publish(Message::KilledEnemy { enemy: self.id });
        }
    }
}
