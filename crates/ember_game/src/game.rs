//! Zone/session orchestrator
//!
//! `Game` owns the outer loop: pick the requested zone, build every piece
//! of per-zone state from scratch (broker, physics world, scene, object
//! roster), run the frame loop until the session quits or a transition is
//! requested, tear everything down, repeat. The game is PLAYING until the
//! player dies; DEAD is left by reloading the starting zone, not by
//! resuming.

use crate::camera::{CameraView, ThirdPersonCamera};
use crate::config::GameConfig;
use crate::enemy::Enemy;
use crate::error::GameError;
use crate::hud::Hud;
use crate::input::{EventQueue, InputHandler};
use crate::object::{GameObject, UpdateContext};
use crate::behavior::PatrolBehavior;
use crate::player::Player;
use crate::quest::{KillEnemyQuest, QuestManager};
use crate::zone::ZoneLoader;
use ember_core::Clock;
use ember_event::{ButtonState, Key, Message, MessageBroker, MessageType, Subscriber};
use ember_physics::PhysicsWorld;
use ember_scene::{MeshRef, Scene, SceneEntity};
use glam::{Quat, Vec3};
use std::cell::RefCell;
use std::rc::Rc;

/// Enemies the seeded kill quest requires.
const QUEST_KILL_COUNT: u32 = 2;

/// Top-level session state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Dead,
}

/// Platform services the game loop needs each frame. The runtime implements
/// this over the window system; tests use a scripted host.
pub trait GameHost {
    /// Translate pending platform events into the queue.
    fn pump(&mut self, events: &EventQueue);

    /// A zone session finished construction and is about to run.
    fn begin_zone(&mut self, zone_name: &str);

    /// Present the frame.
    fn present(&mut self, scene: &Scene, view: &CameraView);

    /// Swap to the death-screen presentation.
    fn show_death_screen(&mut self);
}

/// Session-level reactions recorded off the bus so the loop owner never
/// subscribes itself.
#[derive(Default)]
struct SessionSignals {
    quit: bool,
    restart: bool,
    died: bool,
}

impl Subscriber for SessionSignals {
    fn handle_message(&mut self, message: &Message) {
        match message {
            Message::Quit => self.quit = true,
            Message::KeyPress(key)
                if key.key == Key::R && key.state == ButtonState::Pressed =>
            {
                self.restart = true;
            }
            Message::PlayerDied => self.died = true,
            _ => {}
        }
    }
}

pub struct Game {
    config: GameConfig,
    zones: Vec<Box<dyn ZoneLoader>>,
    starting_zone: usize,
    current_zone: usize,
    next_zone: Option<usize>,
    state: GameState,
    running: bool,
    clock: Rc<dyn Clock>,
}

impl Game {
    /// Create a game over the given zones. Fails if the configured starting
    /// zone is not among them.
    pub fn new(
        config: GameConfig,
        zones: Vec<Box<dyn ZoneLoader>>,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, GameError> {
        let starting_zone = zones
            .iter()
            .position(|zone| zone.name() == config.starting_zone)
            .ok_or_else(|| GameError::MissingStartingZone(config.starting_zone.clone()))?;

        Ok(Self {
            config,
            zones,
            starting_zone,
            current_zone: starting_zone,
            next_zone: Some(starting_zone),
            state: GameState::Playing,
            running: true,
            clock,
        })
    }

    /// Current session state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Name of the zone currently (or last) running.
    pub fn current_zone_name(&self) -> &str {
        self.zones[self.current_zone].name()
    }

    fn resolve_zone(&self, name: &str) -> Result<usize, GameError> {
        self.zones
            .iter()
            .position(|zone| zone.name() == name)
            .ok_or_else(|| GameError::MissingZone(name.to_string()))
    }

    /// Run zone sessions until the game quits.
    pub fn run(&mut self, host: &mut dyn GameHost) -> Result<(), GameError> {
        while self.running {
            if let Some(zone) = self.next_zone.take() {
                self.current_zone = zone;
            }
            self.run_zone(host)?;
        }
        log::info!("game over");
        Ok(())
    }

    /// Build and run one zone session. Returns when the game is quitting or
    /// a next zone has been requested; all zone-scoped state is dropped on
    /// the way out.
    fn run_zone(&mut self, host: &mut dyn GameHost) -> Result<(), GameError> {
        let (zone_name, start_position, statics, spawns, portal) = {
            let zone = &self.zones[self.current_zone];
            (
                zone.name().to_string(),
                zone.player_start_position(),
                zone.static_geometry().to_vec(),
                zone.enemies().to_vec(),
                zone.portal().clone(),
            )
        };
        log::info!("entering zone '{zone_name}'");

        // Fresh per-zone state; subscriptions die with the session
        let broker = Rc::new(MessageBroker::new());
        let mut physics = PhysicsWorld::new();
        let mut scene = Scene::new();
        let events = Rc::new(EventQueue::new());

        let mut objects: Vec<Rc<RefCell<dyn GameObject>>> = Vec::new();

        let input = Rc::new(RefCell::new(InputHandler::new(
            events.clone(),
            broker.publisher(),
        )));
        objects.push(input);

        let player = Rc::new(RefCell::new(Player::new(
            &mut physics,
            &mut scene,
            self.clock.clone(),
            broker.publisher(),
            start_position,
        )));
        {
            let subscriber: Rc<RefCell<dyn Subscriber>> = player.clone();
            broker.subscribe_all(
                &subscriber,
                &[
                    MessageType::KeyPress,
                    MessageType::MouseButtonPress,
                    MessageType::EnemyAttack,
                    MessageType::KilledEnemy,
                    MessageType::QuestComplete,
                ],
            );
        }
        objects.push(player.clone());

        let camera = Rc::new(RefCell::new(ThirdPersonCamera::new(
            player.clone(),
            self.config.screen_width,
            self.config.screen_height,
        )));
        {
            let subscriber: Rc<RefCell<dyn Subscriber>> = camera.clone();
            broker.subscribe_all(
                &subscriber,
                &[
                    MessageType::MouseMove,
                    MessageType::KeyPress,
                    MessageType::ScrollWheel,
                ],
            );
        }
        objects.push(camera.clone());

        let hud = Rc::new(RefCell::new(Hud::new(
            &mut scene,
            Player::STARTING_HEALTH,
            self.config.screen_width,
            self.config.screen_height,
        )));
        {
            let subscriber: Rc<RefCell<dyn Subscriber>> = hud.clone();
            broker.subscribe_all(
                &subscriber,
                &[
                    MessageType::PlayerHealthChange,
                    MessageType::LevelProgress,
                ],
            );
        }
        objects.push(hud);

        let mut quest_manager = QuestManager::new(broker.publisher());
        let quest = Rc::new(RefCell::new(KillEnemyQuest::new(QUEST_KILL_COUNT)));
        {
            let subscriber: Rc<RefCell<dyn Subscriber>> = quest.clone();
            broker.subscribe(&subscriber, MessageType::KilledEnemy);
        }
        quest_manager.add(quest);
        objects.push(Rc::new(RefCell::new(quest_manager)));

        // Zone-defined static geometry
        for geometry in &statics {
            let position = Vec3::from(geometry.position);
            let orientation = Quat::from_array(geometry.orientation);
            let scale = Vec3::from(geometry.scale);

            let mesh = match geometry.mesh.as_str() {
                "cube" => MeshRef::Cube,
                file => MeshRef::File(file.to_string()),
            };
            let mut entity = SceneEntity::new(mesh)
                .with_position(position)
                .with_orientation(orientation)
                .with_scale(scale);
            if let Some(texture) = &geometry.texture {
                entity = entity.with_texture(texture.clone());
            }
            scene.add(entity);

            if geometry.collision {
                physics.add_static_box(position, orientation, scale * 0.5);
            }
        }

        // Zone-defined enemies
        for spawn in &spawns {
            let behavior = PatrolBehavior::new(
                Vec3::from(spawn.bounds_min),
                Vec3::from(spawn.bounds_max),
            );
            let enemy = Rc::new(RefCell::new(Enemy::new(
                &mut physics,
                &mut scene,
                self.clock.clone(),
                broker.publisher(),
                player.clone(),
                camera.clone(),
                Box::new(behavior),
                Vec3::from(spawn.position),
                &spawn.mesh,
                spawn.texture.as_deref(),
            )));
            let subscriber: Rc<RefCell<dyn Subscriber>> = enemy.clone();
            broker.subscribe(&subscriber, MessageType::WeaponCollision);
            objects.push(enemy);
        }

        // Portal trigger volume at the zone's exit
        let portal_position = Vec3::from(portal.position);
        let portal_scale = Vec3::from(portal.scale);
        scene.add(
            SceneEntity::new(MeshRef::Cube)
                .with_position(portal_position)
                .with_scale(portal_scale),
        );
        let portal_body = physics.add_sensor_box(portal_position, portal_scale * 0.5);

        // Lighting
        scene.set_ambient([0.5, 0.5, 0.5, 1.0]);
        let light = scene.add_point_light(
            start_position + Vec3::new(0.0, 10.0, 0.0),
            [10.0, 10.0, 10.0],
        );

        physics.sync_query_pipeline();
        if self.config.physics_debug_draw {
            log::debug!(
                "zone '{zone_name}': {} bodies, {} scene entities",
                physics.body_count(),
                scene.entity_count()
            );
        }

        let signals = Rc::new(RefCell::new(SessionSignals::default()));
        {
            let subscriber: Rc<RefCell<dyn Subscriber>> = signals.clone();
            broker.subscribe_all(
                &subscriber,
                &[
                    MessageType::Quit,
                    MessageType::KeyPress,
                    MessageType::PlayerDied,
                ],
            );
        }

        self.state = GameState::Playing;
        host.begin_zone(&zone_name);

        let zone_start = self.clock.now();
        let mut last = zone_start;

        loop {
            host.pump(&events);
            let now = self.clock.now();
            let delta = now.duration_since(last);
            last = now;

            // Logic phase: integrate, then check the portal
            if self.state == GameState::Playing {
                physics.step(delta.as_secs_f32());

                let player_body = player.borrow().body();
                if physics
                    .contacts_with(portal_body)
                    .iter()
                    .any(|contact| contact.other == player_body)
                {
                    let destination = self.resolve_zone(&portal.destination)?;
                    log::info!("portal touched, next zone '{}'", portal.destination);
                    self.next_zone = Some(destination);
                }
            }

            // Render phase: update objects in registration order, present
            let mut ctx = UpdateContext {
                physics: &mut physics,
                scene: &mut scene,
                delta,
                elapsed: now.duration_since(zone_start),
            };
            for object in &objects {
                object.borrow_mut().update(&mut ctx);
            }

            scene.light_mut(light).position =
                player.borrow().position() + Vec3::new(0.0, 10.0, 0.0);
            host.present(&scene, &camera.borrow().view());

            {
                let mut signals = signals.borrow_mut();
                if signals.quit {
                    self.running = false;
                }
                if std::mem::take(&mut signals.died) && self.state == GameState::Playing {
                    self.state = GameState::Dead;
                    log::info!("player died; press R to restart");
                    host.show_death_screen();
                }
                if std::mem::take(&mut signals.restart) {
                    // Alive: reload the current zone. Dead: back to the start.
                    self.next_zone = Some(match self.state {
                        GameState::Playing => self.current_zone,
                        GameState::Dead => self.starting_zone,
                    });
                }
            }

            if !self.running || self.next_zone.is_some() {
                return Ok(());
            }
        }
    }
}
