//! The player character
//!
//! Central gameplay state machine: movement relay, melee attack window,
//! health and XP bookkeeping, death signaling, and the cosmetic/sensor
//! weapon that follows the character.

use crate::character_controller::CharacterController;
use crate::object::{GameObject, UpdateContext};
use ember_core::{BodyHandle, Clock, GameTime};
use ember_event::{ButtonState, Message, MouseButton, Publisher, Subscriber};
use ember_physics::PhysicsWorld;
use ember_scene::{BoneAttachment, EntityHandle, MeshRef, Scene, SceneEntity};
use glam::{Quat, Vec3};
use std::rc::Rc;
use std::time::Duration;

const WALK_SPEED: f32 = 10.0;
const ATTACK_DURATION: Duration = Duration::from_millis(800);
const ENEMY_ATTACK_DAMAGE: f32 = 10.0;
const KILL_XP: u32 = 30;
const FIRST_LEVEL_XP: u32 = 100;

const IDLE: &str = "Idle";
const RUN: &str = "Run";
const ATTACK: &str = "SwordAttack";

/// Model origin sits at the capsule's feet.
const MODEL_OFFSET: Vec3 = Vec3::new(0.0, -1.1, 0.0);
/// Weapon volume relative to the character, in model space.
const SWORD_OFFSET: Vec3 = Vec3::new(0.45, 0.35, 1.0);
const SWORD_HALF_EXTENTS: Vec3 = Vec3::new(0.1, 0.1, 1.0);

pub struct Player {
    controller: CharacterController,
    entity: EntityHandle,
    sword_entity: EntityHandle,
    sword_body: BodyHandle,
    publisher: Publisher,
    clock: Rc<dyn Clock>,
    orientation: Quat,
    health: f32,
    xp: u32,
    next_level: u32,
    attacking: bool,
    attack_stop: GameTime,
    move_keys_down: u32,
    animation: &'static str,
}

impl Player {
    /// Health a fresh player starts with.
    pub const STARTING_HEALTH: f32 = 100.0;

    /// Create the player at `start_position`, with its render entity,
    /// weapon entity, and weapon sensor volume.
    pub fn new(
        physics: &mut PhysicsWorld,
        scene: &mut Scene,
        clock: Rc<dyn Clock>,
        publisher: Publisher,
        start_position: Vec3,
    ) -> Self {
        let controller =
            CharacterController::new(physics, clock.clone(), start_position, WALK_SPEED);

        let entity = scene.add(
            SceneEntity::new(MeshRef::File("warrior.glb".to_string()))
                .with_position(start_position + MODEL_OFFSET)
                .with_texture("warrior.png")
                .with_animation(IDLE)
                .with_attachment(BoneAttachment {
                    bone: "head".to_string(),
                    mesh: MeshRef::File("warrior_hair.glb".to_string()),
                    texture: Some("warrior.png".to_string()),
                    offset: Vec3::new(0.0, 0.1, 0.0),
                    rotation: Quat::IDENTITY,
                })
                .with_attachment(BoneAttachment {
                    bone: "shoulder.L".to_string(),
                    mesh: MeshRef::File("pauldron.glb".to_string()),
                    texture: Some("armour.png".to_string()),
                    offset: Vec3::ZERO,
                    rotation: Quat::IDENTITY,
                })
                .with_attachment(BoneAttachment {
                    bone: "shoulder.R".to_string(),
                    mesh: MeshRef::File("pauldron.glb".to_string()),
                    texture: Some("armour.png".to_string()),
                    offset: Vec3::ZERO,
                    rotation: Quat::from_rotation_y(std::f32::consts::PI),
                }),
        );

        let sword_entity = scene.add(
            SceneEntity::new(MeshRef::File("sword.glb".to_string()))
                .with_position(start_position + SWORD_OFFSET)
                .with_texture("sword.png"),
        );
        let sword_body =
            physics.add_kinematic_sensor_box(start_position + SWORD_OFFSET, SWORD_HALF_EXTENTS);

        Self {
            controller,
            entity,
            sword_entity,
            sword_body,
            publisher,
            clock,
            orientation: Quat::IDENTITY,
            health: Self::STARTING_HEALTH,
            xp: 0,
            next_level: FIRST_LEVEL_XP,
            attacking: false,
            attack_stop: GameTime::ZERO,
            move_keys_down: 0,
            animation: IDLE,
        }
    }

    /// The player's physics body.
    pub fn body(&self) -> BodyHandle {
        self.controller.body()
    }

    /// Last integrated world position.
    pub fn position(&self) -> Vec3 {
        self.controller.position()
    }

    /// Remaining health.
    pub fn health(&self) -> f32 {
        self.health
    }

    /// XP towards the next level.
    pub fn xp(&self) -> u32 {
        self.xp
    }

    /// Whether an attack window is open.
    pub fn is_attacking(&self) -> bool {
        self.attacking
    }

    /// Walk the character; direction should be normalised or zero.
    pub fn set_walk_direction(&mut self, direction: Vec3) {
        self.controller.set_movement_direction(direction);
    }

    /// Face the character.
    pub fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
    }

    fn credit_xp(&mut self, amount: u32) {
        self.xp += amount;
        while self.xp >= self.next_level {
            self.xp -= self.next_level;
            log::info!("player leveled up");
        }
        self.publisher.publish(Message::LevelProgress {
            progress: self.xp as f32 / self.next_level as f32,
        });
    }
}

impl GameObject for Player {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        if self.attacking {
            if self.clock.now() >= self.attack_stop {
                // Attack window closed
                self.attacking = false;
                self.animation = if self.move_keys_down > 0 { RUN } else { IDLE };
            }

            // Everything the weapon volume touches gets reported, every
            // tick; the victim debounces repeat hits.
            for contact in ctx.physics.contacts_with(self.sword_body) {
                if contact.other != self.controller.body() {
                    self.publisher.publish(Message::WeaponCollision {
                        body: contact.other,
                        position: contact.point,
                    });
                }
            }
        }

        for contact in ctx.physics.contacts_with(self.controller.body()) {
            if contact.other != self.sword_body {
                self.publisher.publish(Message::ObjectCollision {
                    body: contact.other,
                    position: contact.point,
                });
            }
        }

        self.controller.update(ctx.physics);
        let position = self.controller.position();

        let entity = ctx.scene.entity_mut(self.entity);
        entity.position = position + MODEL_OFFSET;
        entity.orientation = self.orientation;
        entity.animation.play(self.animation);
        entity.animation.advance(ctx.delta.as_secs_f32());

        let sword_position = position + self.orientation * SWORD_OFFSET;
        if let Err(error) = ctx.physics.set_body_position(self.sword_body, sword_position) {
            log::warn!("weapon volume missing: {error}");
        }
        let sword = ctx.scene.entity_mut(self.sword_entity);
        sword.position = sword_position;
        sword.orientation = self.orientation;

        if self.health <= 0.0 {
            log::info!("player died");
            self.publisher.publish(Message::PlayerDied);
            // Clamp to a sliver of health so death fires once per drop
            self.health = 1.0;
        }
    }
}

impl Subscriber for Player {
    fn handle_message(&mut self, message: &Message) {
        match message {
            Message::KeyPress(key) if key.key.is_movement() => match key.state {
                ButtonState::Pressed => {
                    self.move_keys_down += 1;
                    if !self.attacking {
                        self.animation = RUN;
                    }
                }
                ButtonState::Released => {
                    self.move_keys_down = self.move_keys_down.saturating_sub(1);
                    if self.move_keys_down == 0 && !self.attacking {
                        self.animation = IDLE;
                    }
                }
            },
            Message::MouseButtonPress(button) => {
                if button.button == MouseButton::Left
                    && button.state == ButtonState::Pressed
                    && !self.attacking
                {
                    self.attacking = true;
                    self.attack_stop = self.clock.now() + ATTACK_DURATION;
                    self.animation = ATTACK;
                }
            }
            Message::EnemyAttack => {
                self.health -= ENEMY_ATTACK_DAMAGE;
                log::debug!("player hit, {} health remaining", self.health);
                self.publisher.publish(Message::PlayerHealthChange {
                    health: self.health,
                });
            }
            Message::KilledEnemy { .. } => self.credit_xp(KILL_XP),
            Message::QuestComplete { xp } => self.credit_xp(*xp),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ember_core::ManualClock;
    use ember_event::{KeyboardInput, Key, MessageBroker, MessageType, MouseButtonInput};
    use std::cell::RefCell;

    struct Recorder {
        received: Rc<RefCell<Vec<Message>>>,
    }

    impl Subscriber for Recorder {
        fn handle_message(&mut self, message: &Message) {
            self.received.borrow_mut().push(*message);
        }
    }

    struct Fixture {
        physics: PhysicsWorld,
        scene: Scene,
        clock: Rc<ManualClock>,
        player: Player,
        received: Rc<RefCell<Vec<Message>>>,
        _recorder: Rc<RefCell<dyn Subscriber>>,
    }

    impl Fixture {
        fn new() -> Self {
            let mut physics = PhysicsWorld::with_gravity(Vec3::ZERO);
            let mut scene = Scene::new();
            let clock = Rc::new(ManualClock::new());
            let broker = Rc::new(MessageBroker::new());
            let player = Player::new(
                &mut physics,
                &mut scene,
                clock.clone(),
                broker.publisher(),
                Vec3::ZERO,
            );

            let received = Rc::new(RefCell::new(Vec::new()));
            let recorder: Rc<RefCell<dyn Subscriber>> = Rc::new(RefCell::new(Recorder {
                received: Rc::clone(&received),
            }));
            broker.subscribe_all(
                &recorder,
                &[
                    MessageType::PlayerHealthChange,
                    MessageType::LevelProgress,
                    MessageType::PlayerDied,
                ],
            );

            Self {
                physics,
                scene,
                clock,
                player,
                received,
                _recorder: recorder,
            }
        }

        fn update(&mut self) {
            let mut ctx = UpdateContext {
                physics: &mut self.physics,
                scene: &mut self.scene,
                delta: Duration::from_millis(16),
                elapsed: Duration::ZERO,
            };
            self.player.update(&mut ctx);
        }

        fn press_attack(&mut self) {
            self.player
                .handle_message(&Message::MouseButtonPress(MouseButtonInput {
                    button: MouseButton::Left,
                    state: ButtonState::Pressed,
                }));
        }

        fn key(&mut self, key: Key, state: ButtonState) {
            self.player
                .handle_message(&Message::KeyPress(KeyboardInput { key, state }));
        }
    }

    #[test]
    fn test_xp_wraps_instead_of_resetting() {
        let mut fixture = Fixture::new();

        // 90 XP from three kills
        for _ in 0..3 {
            fixture.player.handle_message(&Message::KilledEnemy {
                enemy: ember_core::EntityId::next(),
            });
        }
        assert_eq!(fixture.player.xp(), 90);
        fixture.received.borrow_mut().clear();

        // Crediting 30 rolls over the 100 boundary and keeps the remainder
        fixture
            .player
            .handle_message(&Message::QuestComplete { xp: 30 });
        assert_eq!(fixture.player.xp(), 20);

        let received = fixture.received.borrow();
        assert_eq!(received.len(), 1);
        match received[0] {
            Message::LevelProgress { progress } => assert_relative_eq!(progress, 0.2),
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_enemy_attack_reduces_health_and_publishes() {
        let mut fixture = Fixture::new();

        fixture.player.handle_message(&Message::EnemyAttack);

        assert_relative_eq!(fixture.player.health(), 90.0);
        assert_eq!(
            fixture.received.borrow().as_slice(),
            &[Message::PlayerHealthChange { health: 90.0 }]
        );
    }

    #[test]
    fn test_death_publishes_once_and_clamps() {
        let mut fixture = Fixture::new();

        for _ in 0..10 {
            fixture.player.handle_message(&Message::EnemyAttack);
        }
        assert!(fixture.player.health() <= 0.0);

        fixture.update();
        let deaths = |received: &Vec<Message>| {
            received
                .iter()
                .filter(|m| matches!(m, Message::PlayerDied))
                .count()
        };
        assert_eq!(deaths(&fixture.received.borrow()), 1);
        assert_relative_eq!(fixture.player.health(), 1.0);

        // Subsequent frames do not re-fire
        fixture.update();
        fixture.update();
        assert_eq!(deaths(&fixture.received.borrow()), 1);
    }

    #[test]
    fn test_attack_window_opens_once_and_expires() {
        let mut fixture = Fixture::new();

        fixture.press_attack();
        assert!(fixture.player.is_attacking());

        // A second press while attacking is ignored
        fixture.clock.advance(Duration::from_millis(100));
        fixture.press_attack();

        // Original deadline still applies: expired only after 800ms total
        fixture.clock.set(ember_core::GameTime::from_secs_f64(0.79));
        fixture.update();
        assert!(fixture.player.is_attacking());

        fixture.clock.set(ember_core::GameTime::from_secs_f64(0.81));
        fixture.update();
        assert!(!fixture.player.is_attacking());
    }

    #[test]
    fn test_partial_key_release_keeps_running() {
        let mut fixture = Fixture::new();

        fixture.key(Key::W, ButtonState::Pressed);
        fixture.key(Key::A, ButtonState::Pressed);
        fixture.update();
        assert_eq!(
            fixture.scene.entity(fixture.player.entity).animation.current(),
            Some("Run")
        );

        // One of two keys released: still running
        fixture.key(Key::W, ButtonState::Released);
        fixture.update();
        assert_eq!(
            fixture.scene.entity(fixture.player.entity).animation.current(),
            Some("Run")
        );

        // All released: idle
        fixture.key(Key::A, ButtonState::Released);
        fixture.update();
        assert_eq!(
            fixture.scene.entity(fixture.player.entity).animation.current(),
            Some("Idle")
        );
    }
}
