//! Physics world - simulation container and queries

use crate::error::{PhysicsError, Result};
use ember_core::BodyHandle;
use glam::{Quat, Vec3};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude as rapier;
use std::collections::HashMap;

const TIMESTEP: f32 = 1.0 / 60.0;
const MAX_SUBSTEPS: u32 = 4;

/// What role a body plays; queries use this to filter hits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// Immovable zone geometry.
    Static,
    /// Player or enemy capsule.
    Character,
    /// Non-solid trigger volume (portal, weapon).
    Sensor,
}

/// A body touching the queried body.
#[derive(Clone, Copy, Debug)]
pub struct Contact {
    /// The other body.
    pub other: BodyHandle,
    /// World position of the queried body's volume at contact time.
    pub point: Vec3,
}

/// A single raycast intersection.
#[derive(Clone, Copy, Debug)]
pub struct RayHit {
    /// Body that was hit.
    pub body: BodyHandle,
    /// Hit point in world space.
    pub point: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
    /// Role of the hit body.
    pub kind: BodyKind,
}

/// The physics world containing all simulation state for one zone.
pub struct PhysicsWorld {
    pipeline: rapier::PhysicsPipeline,
    gravity: rapier::Vector<f32>,
    integration_params: rapier::IntegrationParameters,
    islands: rapier::IslandManager,
    broad_phase: rapier::DefaultBroadPhase,
    narrow_phase: rapier::NarrowPhase,
    impulse_joints: rapier::ImpulseJointSet,
    multibody_joints: rapier::MultibodyJointSet,
    ccd_solver: rapier::CCDSolver,
    query_pipeline: rapier::QueryPipeline,
    bodies: rapier::RigidBodySet,
    colliders: rapier::ColliderSet,
    kinds: HashMap<BodyHandle, BodyKind>,
    accumulated_time: f32,
}

fn to_handle(raw: rapier::RigidBodyHandle) -> BodyHandle {
    let (index, generation) = raw.into_raw_parts();
    BodyHandle(((index as u64) << 32) | generation as u64)
}

fn from_handle(handle: BodyHandle) -> rapier::RigidBodyHandle {
    rapier::RigidBodyHandle::from_raw_parts((handle.0 >> 32) as u32, handle.0 as u32)
}

fn to_vec3(v: &rapier::Vector<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

impl PhysicsWorld {
    /// Create a world with standard gravity.
    pub fn new() -> Self {
        Self::with_gravity(Vec3::new(0.0, -9.81, 0.0))
    }

    /// Create a world with explicit gravity.
    pub fn with_gravity(gravity: Vec3) -> Self {
        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = TIMESTEP;

        Self {
            pipeline: rapier::PhysicsPipeline::new(),
            gravity: rapier::Vector::new(gravity.x, gravity.y, gravity.z),
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            query_pipeline: rapier::QueryPipeline::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            kinds: HashMap::new(),
            accumulated_time: 0.0,
        }
    }

    // ==================== Body creation ====================

    /// Create an immovable box (zone geometry).
    pub fn add_static_box(&mut self, position: Vec3, rotation: Quat, half_extents: Vec3) -> BodyHandle {
        let body = rapier::RigidBodyBuilder::fixed()
            .translation(rapier::Vector::new(position.x, position.y, position.z))
            .build();
        let handle = self.bodies.insert(body);
        self.colliders.insert_with_parent(
            rapier::ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z).build(),
            handle,
            &mut self.bodies,
        );
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_rotation(
                UnitQuaternion::from_quaternion(Quaternion::new(
                    rotation.w, rotation.x, rotation.y, rotation.z,
                )),
                true,
            );
        }
        let handle = to_handle(handle);
        self.kinds.insert(handle, BodyKind::Static);
        handle
    }

    /// Create an immovable box sensor (portal trigger volume).
    pub fn add_sensor_box(&mut self, position: Vec3, half_extents: Vec3) -> BodyHandle {
        let body = rapier::RigidBodyBuilder::fixed()
            .translation(rapier::Vector::new(position.x, position.y, position.z))
            .build();
        let handle = self.bodies.insert(body);
        self.colliders.insert_with_parent(
            rapier::ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
                .sensor(true)
                .build(),
            handle,
            &mut self.bodies,
        );
        let handle = to_handle(handle);
        self.kinds.insert(handle, BodyKind::Sensor);
        handle
    }

    /// Create a box sensor that is repositioned every frame (weapon volume).
    pub fn add_kinematic_sensor_box(&mut self, position: Vec3, half_extents: Vec3) -> BodyHandle {
        let body = rapier::RigidBodyBuilder::kinematic_position_based()
            .translation(rapier::Vector::new(position.x, position.y, position.z))
            .build();
        let handle = self.bodies.insert(body);
        self.colliders.insert_with_parent(
            rapier::ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
                .sensor(true)
                .build(),
            handle,
            &mut self.bodies,
        );
        let handle = to_handle(handle);
        self.kinds.insert(handle, BodyKind::Sensor);
        handle
    }

    /// Create a character body: a dynamic capsule with rotations locked so
    /// the solver never tips it over.
    pub fn add_character(&mut self, position: Vec3, half_height: f32, radius: f32) -> BodyHandle {
        let body = rapier::RigidBodyBuilder::dynamic()
            .translation(rapier::Vector::new(position.x, position.y, position.z))
            .locked_axes(rapier::LockedAxes::ROTATION_LOCKED)
            .build();
        let handle = self.bodies.insert(body);
        self.colliders.insert_with_parent(
            rapier::ColliderBuilder::capsule_y(half_height, radius).build(),
            handle,
            &mut self.bodies,
        );
        let handle = to_handle(handle);
        self.kinds.insert(handle, BodyKind::Character);
        handle
    }

    // ==================== Body state ====================

    /// Role of a body.
    pub fn body_kind(&self, handle: BodyHandle) -> Option<BodyKind> {
        self.kinds.get(&handle).copied()
    }

    /// World position of a body.
    pub fn body_position(&self, handle: BodyHandle) -> Result<Vec3> {
        self.bodies
            .get(from_handle(handle))
            .map(|body| to_vec3(body.translation()))
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Move a body. Kinematic bodies are given a next-frame target so the
    /// solver sweeps them; everything else teleports.
    pub fn set_body_position(&mut self, handle: BodyHandle, position: Vec3) -> Result<()> {
        self.bodies
            .get_mut(from_handle(handle))
            .map(|body| {
                if body.body_type() == rapier::RigidBodyType::KinematicPositionBased {
                    let rotation = *body.rotation();
                    body.set_next_kinematic_position(rapier::Isometry::from_parts(
                        rapier::Translation::new(position.x, position.y, position.z),
                        rotation,
                    ));
                } else {
                    body.set_translation(
                        rapier::Vector::new(position.x, position.y, position.z),
                        true,
                    );
                }
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Linear velocity of a body.
    pub fn linear_velocity(&self, handle: BodyHandle) -> Result<Vec3> {
        self.bodies
            .get(from_handle(handle))
            .map(|body| to_vec3(body.linvel()))
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    /// Set the linear velocity of a body.
    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec3) -> Result<()> {
        self.bodies
            .get_mut(from_handle(handle))
            .map(|body| {
                body.set_linvel(rapier::Vector::new(velocity.x, velocity.y, velocity.z), true);
            })
            .ok_or(PhysicsError::BodyNotFound(handle))
    }

    // ==================== Simulation ====================

    /// Step the simulation with a fixed internal timestep.
    pub fn step(&mut self, delta_time: f32) {
        self.accumulated_time += delta_time;

        let mut steps = 0;
        while self.accumulated_time >= TIMESTEP && steps < MAX_SUBSTEPS {
            self.pipeline.step(
                &self.gravity,
                &self.integration_params,
                &mut self.islands,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                None,
                &(),
                &(),
            );
            self.accumulated_time -= TIMESTEP;
            steps += 1;
        }

        self.query_pipeline.update(&self.colliders);
    }

    /// Sync the query pipeline with current colliders. Call after creating
    /// bodies if a query is needed before the first `step`.
    pub fn sync_query_pipeline(&mut self) {
        self.query_pipeline.update(&self.colliders);
    }

    // ==================== Queries ====================

    /// All bodies currently touching `handle`, through solid contacts or
    /// sensor intersections. `point` on each result is the queried body's
    /// own world position.
    pub fn contacts_with(&self, handle: BodyHandle) -> Vec<Contact> {
        let raw = from_handle(handle);
        let Some(body) = self.bodies.get(raw) else {
            return Vec::new();
        };
        let point = to_vec3(body.translation());

        let mut contacts = Vec::new();
        for &collider in body.colliders() {
            for (h1, h2, intersecting) in self.narrow_phase.intersection_pairs_with(collider) {
                if !intersecting {
                    continue;
                }
                let other = if h1 == collider { h2 } else { h1 };
                if let Some(other) = self.collider_body(other) {
                    contacts.push(Contact { other, point });
                }
            }

            for pair in self.narrow_phase.contact_pairs_with(collider) {
                if !pair.has_any_active_contact {
                    continue;
                }
                let other = if pair.collider1 == collider {
                    pair.collider2
                } else {
                    pair.collider1
                };
                if let Some(other) = self.collider_body(other) {
                    contacts.push(Contact { other, point });
                }
            }
        }

        contacts
    }

    fn collider_body(&self, collider: rapier::ColliderHandle) -> Option<BodyHandle> {
        self.colliders
            .get(collider)
            .and_then(|collider| collider.parent())
            .map(to_handle)
    }

    /// All solid bodies intersected by a ray, nearest first. Sensors are
    /// skipped; `exclude` bodies are ignored.
    pub fn cast_ray_all(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: &[BodyHandle],
    ) -> Vec<RayHit> {
        let ray = rapier::Ray::new(
            rapier::Point::new(origin.x, origin.y, origin.z),
            rapier::Vector::new(direction.x, direction.y, direction.z),
        );

        let mut filter = rapier::QueryFilter::new().exclude_sensors();
        for &excluded in exclude {
            filter = filter.exclude_rigid_body(from_handle(excluded));
        }

        let mut hits = Vec::new();
        self.query_pipeline.intersections_with_ray(
            &self.bodies,
            &self.colliders,
            &ray,
            max_distance,
            true,
            filter,
            |collider, intersection| {
                if let Some(body) = self.collider_body(collider) {
                    let point = ray.point_at(intersection.time_of_impact);
                    hits.push(RayHit {
                        body,
                        point: Vec3::new(point.x, point.y, point.z),
                        distance: intersection.time_of_impact,
                        kind: self.kinds.get(&body).copied().unwrap_or(BodyKind::Static),
                    });
                }
                true
            },
        );

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    // ==================== Introspection ====================

    /// Number of rigid bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
