//! Scene entities and lights

use crate::animation::AnimationState;
use glam::{Quat, Vec3};

/// Handle to a scene entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityHandle(usize);

/// Handle to a point light.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LightHandle(usize);

/// What geometry an entity renders.
#[derive(Clone, Debug, PartialEq)]
pub enum MeshRef {
    /// Unit cube.
    Cube,
    /// Screen-aligned quad (HUD bars, billboards).
    Sprite,
    /// Mesh loaded from an asset file.
    File(String),
}

/// A cosmetic sub-mesh tied to a skeletal bone (sword, hair, shoulder pads).
/// The presenter resolves the bone transform at draw time.
#[derive(Clone, Debug)]
pub struct BoneAttachment {
    pub bone: String,
    pub mesh: MeshRef,
    pub texture: Option<String>,
    pub offset: Vec3,
    pub rotation: Quat,
}

/// A renderable entity.
#[derive(Clone, Debug)]
pub struct SceneEntity {
    pub position: Vec3,
    pub orientation: Quat,
    pub scale: Vec3,
    pub mesh: MeshRef,
    pub texture: Option<String>,
    pub animation: AnimationState,
    pub attachments: Vec<BoneAttachment>,
    pub visible: bool,
}

impl SceneEntity {
    /// Create an entity at the origin with unit scale.
    pub fn new(mesh: MeshRef) -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            scale: Vec3::ONE,
            mesh,
            texture: None,
            animation: AnimationState::default(),
            attachments: Vec::new(),
            visible: true,
        }
    }

    /// Set position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set orientation.
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self
    }

    /// Set scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Set texture.
    pub fn with_texture(mut self, texture: impl Into<String>) -> Self {
        self.texture = Some(texture.into());
        self
    }

    /// Set the initially playing animation clip.
    pub fn with_animation(mut self, clip: impl Into<String>) -> Self {
        self.animation = AnimationState::playing(clip);
        self
    }

    /// Add a bone attachment.
    pub fn with_attachment(mut self, attachment: BoneAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// A point light.
#[derive(Clone, Copy, Debug)]
pub struct PointLight {
    pub position: Vec3,
    pub colour: [f32; 3],
}

/// The retained scene for one zone.
pub struct Scene {
    entities: Vec<SceneEntity>,
    lights: Vec<PointLight>,
    ambient: [f32; 4],
    sky_colour: [f32; 4],
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            lights: Vec::new(),
            ambient: [0.5, 0.5, 0.5, 1.0],
            sky_colour: [0.275, 0.51, 0.796, 1.0],
        }
    }

    /// Add an entity.
    pub fn add(&mut self, entity: SceneEntity) -> EntityHandle {
        self.entities.push(entity);
        EntityHandle(self.entities.len() - 1)
    }

    /// Look up an entity.
    pub fn entity(&self, handle: EntityHandle) -> &SceneEntity {
        &self.entities[handle.0]
    }

    /// Look up an entity mutably.
    pub fn entity_mut(&mut self, handle: EntityHandle) -> &mut SceneEntity {
        &mut self.entities[handle.0]
    }

    /// Iterate all entities, for the presenter.
    pub fn entities(&self) -> impl Iterator<Item = &SceneEntity> {
        self.entities.iter()
    }

    /// Number of entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Add a point light.
    pub fn add_point_light(&mut self, position: Vec3, colour: [f32; 3]) -> LightHandle {
        self.lights.push(PointLight { position, colour });
        LightHandle(self.lights.len() - 1)
    }

    /// Look up a light mutably.
    pub fn light_mut(&mut self, handle: LightHandle) -> &mut PointLight {
        &mut self.lights[handle.0]
    }

    /// Set the ambient light level.
    pub fn set_ambient(&mut self, ambient: [f32; 4]) {
        self.ambient = ambient;
    }

    /// Ambient light level.
    pub fn ambient(&self) -> [f32; 4] {
        self.ambient
    }

    /// Sky/background colour.
    pub fn sky_colour(&self) -> [f32; 4] {
        self.sky_colour
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_roundtrip() {
        let mut scene = Scene::new();
        let handle = scene.add(
            SceneEntity::new(MeshRef::Cube)
                .with_position(Vec3::new(1.0, 2.0, 3.0))
                .with_scale(Vec3::splat(2.0)),
        );

        assert_eq!(scene.entity(handle).position, Vec3::new(1.0, 2.0, 3.0));

        scene.entity_mut(handle).position = Vec3::ZERO;
        assert_eq!(scene.entity(handle).position, Vec3::ZERO);
        assert_eq!(scene.entity_count(), 1);
    }

    #[test]
    fn test_light_follows() {
        let mut scene = Scene::new();
        let light = scene.add_point_light(Vec3::ZERO, [10.0, 10.0, 10.0]);

        scene.light_mut(light).position = Vec3::new(0.0, 10.0, 0.0);
        assert_eq!(scene.light_mut(light).position.y, 10.0);
    }
}
