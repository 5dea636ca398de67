//! Third-person follow camera
//!
//! The camera orbits the player on a sphere described by polar coordinates
//! (azimuth/altitude) and drives the player's walk direction from the held
//! movement keys, expressed in camera space. Static geometry that encloses
//! the camera pulls it in towards the player.

use crate::object::{GameObject, UpdateContext};
use crate::player::Player;
use ember_event::{ButtonState, Key, Message, Subscriber};
use ember_physics::BodyKind;
use glam::{Quat, Vec3};
use std::cell::RefCell;
use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

const MOUSE_SENSITIVITY: f32 = 0.0025;
const ALTITUDE_MARGIN: f32 = 0.01;
const SCROLL_ZOOM: f32 = -1.5;
const MIN_DISTANCE: f32 = 5.0;
const MAX_DISTANCE: f32 = 100.0;

/// Snapshot of the camera handed to the presenter each frame.
#[derive(Clone, Copy, Debug)]
pub struct CameraView {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
}

pub struct ThirdPersonCamera {
    player: Rc<RefCell<Player>>,
    key_map: HashMap<Key, ButtonState>,
    azimuth: f32,
    altitude: f32,
    camera_distance: f32,
    position: Vec3,
    aspect: f32,
}

impl ThirdPersonCamera {
    /// Create a camera following `player`.
    pub fn new(player: Rc<RefCell<Player>>, width: u32, height: u32) -> Self {
        let key_map = [Key::W, Key::A, Key::S, Key::D]
            .into_iter()
            .map(|key| (key, ButtonState::Released))
            .collect();

        Self {
            player,
            key_map,
            azimuth: FRAC_PI_2,
            altitude: FRAC_PI_2 / 4.0,
            camera_distance: 20.0,
            position: Vec3::new(0.0, 0.0, 20.0),
            aspect: width as f32 / height as f32,
        }
    }

    /// World position of the camera.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Current zoom distance.
    pub fn distance(&self) -> f32 {
        self.camera_distance
    }

    /// Current altitude angle.
    pub fn altitude(&self) -> f32 {
        self.altitude
    }

    /// View snapshot for the presenter.
    pub fn view(&self) -> CameraView {
        CameraView {
            position: self.position,
            target: self.player.borrow().position(),
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect: self.aspect,
        }
    }

    fn is_down(&self, key: Key) -> bool {
        self.key_map.get(&key) == Some(&ButtonState::Pressed)
    }

    fn any_movement_key_down(&self) -> bool {
        self.is_down(Key::W) || self.is_down(Key::A) || self.is_down(Key::S) || self.is_down(Key::D)
    }

    /// Offset from the player to the camera on the orbit sphere.
    fn orbit_offset(&self, distance: f32) -> Vec3 {
        let inclination = FRAC_PI_2 - self.altitude;
        Vec3::new(
            distance * inclination.sin() * self.azimuth.cos(),
            distance * inclination.cos(),
            distance * inclination.sin() * self.azimuth.sin(),
        )
    }

    /// Unit vector from the camera towards the player, flattened later for
    /// walking.
    fn forward(&self) -> Vec3 {
        -self.orbit_offset(1.0).normalize()
    }

    fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }
}

impl GameObject for ThirdPersonCamera {
    fn update(&mut self, ctx: &mut UpdateContext<'_>) {
        // Walk direction from held keys, in camera space
        let mut walk_direction = Vec3::ZERO;
        if self.is_down(Key::W) {
            walk_direction += self.forward();
        }
        if self.is_down(Key::S) {
            walk_direction -= self.forward();
        }
        if self.is_down(Key::A) {
            walk_direction -= self.right();
        }
        if self.is_down(Key::D) {
            walk_direction += self.right();
        }
        walk_direction.y = 0.0;
        walk_direction = walk_direction.normalize_or_zero();

        let (player_position, player_body) = {
            let mut player = self.player.borrow_mut();
            player.set_walk_direction(walk_direction);
            (player.position(), player.body())
        };

        // Pull the camera in if static geometry encloses it. Take the first
        // body the ray hits; if the camera sits closer than that body's far
        // side, we are inside it and clamp to the near side.
        let mut distance = self.camera_distance;
        let camera_position = player_position + self.orbit_offset(self.camera_distance);
        let to_camera = (camera_position - player_position).normalize_or_zero();
        let hits: Vec<_> = ctx
            .physics
            .cast_ray_all(player_position, to_camera, self.camera_distance, &[player_body])
            .into_iter()
            .filter(|hit| hit.kind == BodyKind::Static)
            .collect();

        if let Some(first) = hits.first() {
            let far_side = hits
                .iter()
                .rev()
                .find(|hit| hit.body == first.body)
                .map(|hit| hit.distance)
                .unwrap_or(first.distance);
            if self.camera_distance < far_side {
                distance = distance.min(first.distance);
            }
        }

        self.position = player_position + self.orbit_offset(distance);

        // Snap the player to the camera direction while moving
        if self.any_movement_key_down() {
            self.player
                .borrow_mut()
                .set_orientation(Quat::from_rotation_y(-self.azimuth));
        }
    }
}

impl Subscriber for ThirdPersonCamera {
    fn handle_message(&mut self, message: &Message) {
        match message {
            Message::MouseMove(motion) => {
                self.azimuth += motion.delta_x * MOUSE_SENSITIVITY;
                // Clamp altitude so the camera never flips over the pole
                self.altitude = (self.altitude + motion.delta_y * MOUSE_SENSITIVITY)
                    .clamp(0.0, FRAC_PI_2 - ALTITUDE_MARGIN);
            }
            Message::KeyPress(key) => {
                self.key_map.insert(key.key, key.state);
            }
            Message::ScrollWheel(scroll) => {
                self.camera_distance = (self.camera_distance + scroll.delta_y * SCROLL_ZOOM)
                    .clamp(MIN_DISTANCE, MAX_DISTANCE);
            }
            _ => {}
        }
    }
}
