//! The full combat loop over the bus: attack window -> weapon contacts ->
//! enemy damage/debounce -> death -> kill quest -> reward -> XP/level
//! progress, with objects wired exactly as a zone session wires them.

use ember_core::ManualClock;
use ember_event::{ButtonState, Message, MessageBroker, MessageType, MouseButton,
    MouseButtonInput, Subscriber};
use ember_game::{Enemy, GameObject, Hud, KillEnemyQuest, PatrolBehavior, Player, QuestManager,
    ThirdPersonCamera, UpdateContext};
use ember_physics::PhysicsWorld;
use ember_scene::Scene;
use glam::Vec3;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

struct Recorder {
    received: Rc<RefCell<Vec<Message>>>,
}

impl Subscriber for Recorder {
    fn handle_message(&mut self, message: &Message) {
        self.received.borrow_mut().push(*message);
    }
}

#[test]
fn test_kill_an_enemy_and_complete_the_quest() {
    let broker = Rc::new(MessageBroker::new());
    let mut physics = PhysicsWorld::with_gravity(Vec3::ZERO);
    let mut scene = Scene::new();
    let clock = Rc::new(ManualClock::new());

    let player = Rc::new(RefCell::new(Player::new(
        &mut physics,
        &mut scene,
        clock.clone(),
        broker.publisher(),
        Vec3::ZERO,
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

    let camera = Rc::new(RefCell::new(ThirdPersonCamera::new(player.clone(), 800, 600)));

    let hud = Rc::new(RefCell::new(Hud::new(
        &mut scene,
        Player::STARTING_HEALTH,
        800,
        600,
    )));
    {
        let subscriber: Rc<RefCell<dyn Subscriber>> = hud.clone();
        broker.subscribe_all(
            &subscriber,
            &[MessageType::PlayerHealthChange, MessageType::LevelProgress],
        );
    }

    let mut quest_manager = QuestManager::new(broker.publisher());
    let quest = Rc::new(RefCell::new(KillEnemyQuest::new(1)));
    {
        let subscriber: Rc<RefCell<dyn Subscriber>> = quest.clone();
        broker.subscribe(&subscriber, MessageType::KilledEnemy);
    }
    quest_manager.add(quest);
    let quest_manager = Rc::new(RefCell::new(quest_manager));

    // Standing inside the weapon volume's reach
    let enemy = Rc::new(RefCell::new(Enemy::new(
        &mut physics,
        &mut scene,
        clock.clone(),
        broker.publisher(),
        player.clone(),
        camera.clone(),
        Box::new(PatrolBehavior::new(Vec3::splat(-5.0), Vec3::splat(5.0))),
        Vec3::new(0.5, 0.35, 1.0),
        "wolf.glb",
        None,
    )));
    {
        let subscriber: Rc<RefCell<dyn Subscriber>> = enemy.clone();
        broker.subscribe(&subscriber, MessageType::WeaponCollision);
    }

    let received = Rc::new(RefCell::new(Vec::new()));
    let recorder: Rc<RefCell<dyn Subscriber>> = Rc::new(RefCell::new(Recorder {
        received: Rc::clone(&received),
    }));
    broker.subscribe_all(
        &recorder,
        &[
            MessageType::KilledEnemy,
            MessageType::QuestComplete,
            MessageType::LevelProgress,
            MessageType::PlayerHealthChange,
        ],
    );

    let attack = Message::MouseButtonPress(MouseButtonInput {
        button: MouseButton::Left,
        state: ButtonState::Pressed,
    });

    // Frame loop shaped like a zone session: advance time, inject input,
    // step physics, update objects in registration order
    for frame in 0..120 {
        clock.advance(Duration::from_millis(20));
        if frame == 1 || frame == 45 {
            broker.publish(&attack);
        }

        physics.step(0.02);

        let mut ctx = UpdateContext {
            physics: &mut physics,
            scene: &mut scene,
            delta: Duration::from_millis(20),
            elapsed: Duration::from_millis(20 * (frame + 1)),
        };
        player.borrow_mut().update(&mut ctx);
        hud.borrow_mut().update(&mut ctx);
        quest_manager.borrow_mut().update(&mut ctx);
        enemy.borrow_mut().update(&mut ctx);
    }

    // Two attack windows, two debounced hits each: the enemy is dead
    assert!(enemy.borrow().is_dead());
    assert_eq!(enemy.borrow().health(), 0.0);

    let received = received.borrow();
    let count = |kind: MessageType| received.iter().filter(|m| m.kind() == kind).count();

    // Death tallied exactly once, quest rewarded exactly once and removed
    assert_eq!(count(MessageType::KilledEnemy), 1);
    assert_eq!(count(MessageType::QuestComplete), 1);
    assert_eq!(quest_manager.borrow().quest_count(), 0);

    // 30 kill XP + 50 quest XP
    assert_eq!(player.borrow().xp(), 80);
    let progress: Vec<f32> = received
        .iter()
        .filter_map(|m| match m {
            Message::LevelProgress { progress } => Some(*progress),
            _ => None,
        })
        .collect();
    assert_eq!(progress, [0.3, 0.8]);

    // The enemy landed its melee attacks while it lived
    assert!(player.borrow().health() < Player::STARTING_HEALTH);
}
