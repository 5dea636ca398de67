//! Heads-up display
//!
//! Two screen-space bars - health and level progress - resized from the
//! messages the player publishes. The HUD never reads player state
//! directly.

use crate::object::{GameObject, UpdateContext};
use ember_event::{Message, Subscriber};
use ember_scene::{EntityHandle, MeshRef, Scene, SceneEntity};
use glam::Vec3;

const BAR_HEIGHT: f32 = 10.0;
const BAR_MARGIN: f32 = 20.0;

pub struct Hud {
    health_bar: EntityHandle,
    level_progress_bar: EntityHandle,
    width: f32,
    starting_health: f32,
    health_fraction: f32,
    level_progress: f32,
}

impl Hud {
    /// Create the HUD bars for a screen of `width` x `height`.
    pub fn new(scene: &mut Scene, starting_health: f32, width: u32, height: u32) -> Self {
        let (width, height) = (width as f32, height as f32);

        let health_bar = scene.add(
            SceneEntity::new(MeshRef::Sprite)
                .with_position(Vec3::new(0.0, height - BAR_MARGIN, 1.0))
                .with_scale(Vec3::new(width - 2.0 * BAR_MARGIN, BAR_HEIGHT, 1.0))
                .with_texture("health_bar.png"),
        );
        let level_progress_bar = scene.add(
            SceneEntity::new(MeshRef::Sprite)
                .with_position(Vec3::new(0.0, BAR_MARGIN - height, 1.0))
                .with_scale(Vec3::new(0.0, BAR_HEIGHT, 1.0))
                .with_texture("level_bar.png"),
        );

        Self {
            health_bar,
            level_progress_bar,
            width,
            starting_health,
            health_fraction: 1.0,
            level_progress: 0.0,
        }
    }

    fn usable_width(&self) -> f32 {
        self.width - 2.0 * BAR_MARGIN
    }
}

impl GameObject for Hud {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        let width = self.usable_width();
        ctx.scene.entity_mut(self.health_bar).scale =
            Vec3::new(width * self.health_fraction, BAR_HEIGHT, 1.0);
        ctx.scene.entity_mut(self.level_progress_bar).scale =
            Vec3::new(width * self.level_progress, BAR_HEIGHT, 1.0);
    }
}

impl Subscriber for Hud {
    fn handle_message(&mut self, message: &Message) {
        match message {
            Message::PlayerHealthChange { health } => {
                self.health_fraction = (health / self.starting_health).max(0.0);
            }
            Message::LevelProgress { progress } => {
                self.level_progress = *progress;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_physics::PhysicsWorld;
    use std::time::Duration;

    fn update(hud: &mut Hud, physics: &mut PhysicsWorld, scene: &mut Scene) {
        let mut ctx = UpdateContext {
            physics,
            scene,
            delta: Duration::from_millis(16),
            elapsed: Duration::ZERO,
        };
        hud.update(&mut ctx);
    }

    #[test]
    fn test_bars_track_messages() {
        let mut physics = PhysicsWorld::with_gravity(glam::Vec3::ZERO);
        let mut scene = Scene::new();
        let mut hud = Hud::new(&mut scene, 100.0, 800, 600);

        hud.handle_message(&Message::PlayerHealthChange { health: 50.0 });
        hud.handle_message(&Message::LevelProgress { progress: 0.25 });
        update(&mut hud, &mut physics, &mut scene);

        let usable = 800.0 - 40.0;
        assert_eq!(scene.entity(hud.health_bar).scale.x, usable * 0.5);
        assert_eq!(scene.entity(hud.level_progress_bar).scale.x, usable * 0.25);
    }

    #[test]
    fn test_health_bar_never_negative() {
        let mut physics = PhysicsWorld::with_gravity(glam::Vec3::ZERO);
        let mut scene = Scene::new();
        let mut hud = Hud::new(&mut scene, 100.0, 800, 600);

        hud.handle_message(&Message::PlayerHealthChange { health: -10.0 });
        update(&mut hud, &mut physics, &mut scene);

        assert_eq!(scene.entity(hud.health_bar).scale.x, 0.0);
    }
}
