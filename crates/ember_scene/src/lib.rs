//! # ember_scene - Retained Scene Model
//!
//! The scene the gameplay crates mutate and the presenter reads each frame:
//! entities with transforms, mesh/texture references, animation state, bone
//! attachments for cosmetic sub-meshes, and lights. No rendering code lives
//! here - playback and drawing are the presenter's concern.

mod animation;
mod scene;

pub use animation::AnimationState;
pub use scene::{BoneAttachment, EntityHandle, LightHandle, MeshRef, PointLight, Scene,
    SceneEntity};
