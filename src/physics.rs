use nalgebra::{Point2, Vector2};
use rapier2d::prelude as rap2d;

// ---------------------------------------------------------------------------
// Shared Configuration Types
// ---------------------------------------------------------------------------

/// Defines how a body reacts to physics forces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyType {
    Dynamic, // Affected by forces and collisions (dominoes, spawned boxes)
    Static,  // Never moves, infinite mass (floor, walls, pillar)
}

impl BodyType {
    fn builder(self) -> rap2d::RigidBodyBuilder {
        match self {
            BodyType::Dynamic => rap2d::RigidBodyBuilder::dynamic(),
            BodyType::Static => rap2d::RigidBodyBuilder::fixed(),
        }
    }
}

/// Collider material, passed through to Rapier verbatim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub density: f32,
    pub friction: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self { density: 1.0, friction: 0.3 }
    }
}

/// Lower/upper rotation limits of a revolute joint, in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleLimits {
    pub lower: f32,
    pub upper: f32,
}

impl AngleLimits {
    pub fn degrees(lower: f32, upper: f32) -> Self {
        Self { lower: lower.to_radians(), upper: upper.to_radians() }
    }

    /// Zero angular range: the two bodies move as one.
    pub const fn weld() -> Self {
        Self { lower: 0.0, upper: 0.0 }
    }

    pub fn is_weld(&self) -> bool {
        self.lower == 0.0 && self.upper == 0.0
    }
}

// ---------------------------------------------------------------------------
// 2D Physics World
// ---------------------------------------------------------------------------

/// One simulation run. Dropping it destroys every body, collider and joint.
pub struct PhysicsWorld2D {
    gravity: Vector2<f32>,
    pipeline: rap2d::PhysicsPipeline,
    integration_params: rap2d::IntegrationParameters,
    islands: rap2d::IslandManager,
    broad_phase: rap2d::BroadPhase,
    narrow_phase: rap2d::NarrowPhase,
    bodies: rap2d::RigidBodySet,
    colliders: rap2d::ColliderSet,
    impulse_joints: rap2d::ImpulseJointSet,
    multibody_joints: rap2d::MultibodyJointSet,
    ccd_solver: rap2d::CCDSolver,
    query_pipeline: rap2d::QueryPipeline,
}

impl PhysicsWorld2D {
    pub fn new(gravity: Vector2<f32>) -> Self {
        Self {
            gravity,
            pipeline: rap2d::PhysicsPipeline::new(),
            integration_params: rap2d::IntegrationParameters::default(),
            islands: rap2d::IslandManager::new(),
            broad_phase: rap2d::BroadPhase::new(),
            narrow_phase: rap2d::NarrowPhase::new(),
            bodies: rap2d::RigidBodySet::new(),
            colliders: rap2d::ColliderSet::new(),
            impulse_joints: rap2d::ImpulseJointSet::new(),
            multibody_joints: rap2d::MultibodyJointSet::new(),
            ccd_solver: rap2d::CCDSolver::new(),
            query_pipeline: rap2d::QueryPipeline::new(),
        }
    }

    /// Advances the world by `dt`, split into `sub_steps` equal pipeline steps.
    pub fn step(&mut self, dt: f32, sub_steps: u32) {
        let sub_steps = sub_steps.max(1);
        self.integration_params.dt = dt / sub_steps as f32;

        for _ in 0..sub_steps {
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
                Some(&mut self.query_pipeline),
                &(),
                &(),
            );
        }
    }

    // -------------------------------------------------------------------------
    // Body Management
    // -------------------------------------------------------------------------

    /// Creates a rigid body with a box collider attached.
    pub fn spawn_box(
        &mut self,
        position: Vector2<f32>,
        half_extents: Vector2<f32>,
        body_type: BodyType,
        material: Material,
    ) -> rap2d::RigidBodyHandle {
        let collider = rap2d::ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            .density(material.density)
            .friction(material.friction)
            .build();
        self.insert_body(position, body_type, collider)
    }

    /// Creates a rigid body with a circle collider attached.
    pub fn spawn_ball(
        &mut self,
        position: Vector2<f32>,
        radius: f32,
        body_type: BodyType,
        material: Material,
    ) -> rap2d::RigidBodyHandle {
        let collider = rap2d::ColliderBuilder::ball(radius)
            .density(material.density)
            .friction(material.friction)
            .build();
        self.insert_body(position, body_type, collider)
    }

    fn insert_body(
        &mut self,
        position: Vector2<f32>,
        body_type: BodyType,
        collider: rap2d::Collider,
    ) -> rap2d::RigidBodyHandle {
        let body = body_type.builder().translation(position).build();
        let handle = self.bodies.insert(body);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        handle
    }

    /// Position and rotation (radians, counter-clockwise) of a body.
    #[inline(always)]
    pub fn get_transform(&self, handle: rap2d::RigidBodyHandle) -> Option<(Vector2<f32>, f32)> {
        self.bodies.get(handle).map(|b| {
            let pos = b.position();
            (pos.translation.vector, pos.rotation.angle())
        })
    }

    /// Maps a world-space point into the body's local frame.
    pub fn local_point(&self, handle: rap2d::RigidBodyHandle, world: Point2<f32>) -> Option<Point2<f32>> {
        self.bodies
            .get(handle)
            .map(|b| b.position().inverse_transform_point(&world))
    }

    /// Maps a body-local point into world space.
    pub fn world_point(&self, handle: rap2d::RigidBodyHandle, local: Point2<f32>) -> Option<Point2<f32>> {
        self.bodies.get(handle).map(|b| b.position().transform_point(&local))
    }

    // -------------------------------------------------------------------------
    // Joints
    // -------------------------------------------------------------------------

    /// Creates a limited revolute joint (hinge) between two bodies. The two
    /// bodies do not collide with each other.
    pub fn add_revolute_joint(
        &mut self,
        body1: rap2d::RigidBodyHandle,
        body2: rap2d::RigidBodyHandle,
        anchor1: Point2<f32>,
        anchor2: Point2<f32>,
        limits: AngleLimits,
    ) -> rap2d::ImpulseJointHandle {
        let params = rap2d::RevoluteJointBuilder::new()
            .local_anchor1(anchor1)
            .local_anchor2(anchor2)
            .limits([limits.lower, limits.upper])
            .contacts_enabled(false)
            .build();

        self.impulse_joints.insert(body1, body2, params, true)
    }

    /// World-space position of a joint's anchor on its first body.
    pub fn joint_anchor(&self, handle: rap2d::ImpulseJointHandle) -> Option<Point2<f32>> {
        let joint = self.impulse_joints.get(handle)?;
        self.world_point(joint.body1, joint.data.local_anchor1())
    }

    // -------------------------------------------------------------------------
    // Stats
    // -------------------------------------------------------------------------

    #[inline]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    #[inline]
    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }
}
