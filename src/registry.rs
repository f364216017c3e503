// src/registry.rs
//! Capacity-bounded entity collections backed by physics handles.
//!
//! Entities are append-only for the lifetime of a world: indices are 0-based,
//! contiguous and never compacted. The physics world owns the bodies; the
//! registry only remembers their handles and the geometry needed for drawing.
//! A full collection drops creation requests and reports `None`.

use nalgebra::{Point2, Vector2};
use rapier2d::prelude::{ImpulseJointHandle, RigidBodyHandle};

use crate::config::Capacities;
use crate::physics::{AngleLimits, BodyType, Material, PhysicsWorld2D};

/// A `Vec` that refuses to grow past a fixed capacity.
#[derive(Debug, Clone)]
pub struct Bounded<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> Bounded<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { items: Vec::with_capacity(capacity.min(1024)), capacity }
    }

    /// Appends and returns the new index, or `None` when full.
    pub fn push(&mut self, item: T) -> Option<usize> {
        if self.is_full() {
            return None;
        }
        self.items.push(item);
        Some(self.items.len() - 1)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.items.len()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a, T> IntoIterator for &'a Bounded<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxEntity {
    pub body: RigidBodyHandle,
    pub half_extents: Vector2<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallEntity {
    pub body: RigidBodyHandle,
    pub radius: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointEntity {
    pub joint: ImpulseJointHandle,
    pub limits: AngleLimits,
}

/// Which box collection a box goes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxCollection {
    /// Scene geometry built by the scene builder.
    Layout,
    /// Boxes spawned by the user.
    Spawned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxHandle {
    pub collection: BoxCollection,
    pub index: usize,
    pub body: RigidBodyHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BallHandle {
    pub index: usize,
    pub body: RigidBodyHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointHandle {
    pub index: usize,
    pub joint: ImpulseJointHandle,
}

/// Entity counts at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryCounts {
    pub layout_boxes: usize,
    pub boxes: usize,
    pub balls: usize,
    pub joints: usize,
}

impl RegistryCounts {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct EntityRegistry {
    layout_boxes: Bounded<BoxEntity>,
    boxes: Bounded<BoxEntity>,
    balls: Bounded<BallEntity>,
    joints: Bounded<JointEntity>,
}

impl EntityRegistry {
    pub fn new(capacities: Capacities) -> Self {
        Self {
            layout_boxes: Bounded::with_capacity(capacities.layout_boxes),
            boxes: Bounded::with_capacity(capacities.boxes),
            balls: Bounded::with_capacity(capacities.balls),
            joints: Bounded::with_capacity(capacities.joints),
        }
    }

    fn box_collection(&self, collection: BoxCollection) -> &Bounded<BoxEntity> {
        match collection {
            BoxCollection::Layout => &self.layout_boxes,
            BoxCollection::Spawned => &self.boxes,
        }
    }

    fn box_collection_mut(&mut self, collection: BoxCollection) -> &mut Bounded<BoxEntity> {
        match collection {
            BoxCollection::Layout => &mut self.layout_boxes,
            BoxCollection::Spawned => &mut self.boxes,
        }
    }

    /// Creates a box centered at `position` with full size `size`.
    ///
    /// Capacity is checked before the physics world is touched, so a dropped
    /// request leaves no orphan body behind.
    pub fn create_box(
        &mut self,
        world: &mut PhysicsWorld2D,
        collection: BoxCollection,
        position: Vector2<f32>,
        size: Vector2<f32>,
        material: Material,
        body_type: BodyType,
    ) -> Option<BoxHandle> {
        if self.box_collection(collection).is_full() {
            log::trace!("{collection:?} box collection full, dropping box at {position:?}");
            return None;
        }
        let half_extents = size / 2.0;
        let body = world.spawn_box(position, half_extents, body_type, material);
        let index = self
            .box_collection_mut(collection)
            .push(BoxEntity { body, half_extents })?;
        Some(BoxHandle { collection, index, body })
    }

    /// Creates a box whose bottom edge is centered on `bottom_center`.
    pub fn create_box_anchored_at_bottom(
        &mut self,
        world: &mut PhysicsWorld2D,
        collection: BoxCollection,
        bottom_center: Vector2<f32>,
        size: Vector2<f32>,
        material: Material,
        body_type: BodyType,
    ) -> Option<BoxHandle> {
        let center = bottom_center + Vector2::new(0.0, size.y / 2.0);
        self.create_box(world, collection, center, size, material, body_type)
    }

    pub fn create_ball(
        &mut self,
        world: &mut PhysicsWorld2D,
        position: Vector2<f32>,
        radius: f32,
        material: Material,
        body_type: BodyType,
    ) -> Option<BallHandle> {
        if self.balls.is_full() {
            log::trace!("ball collection full, dropping ball at {position:?}");
            return None;
        }
        let body = world.spawn_ball(position, radius, body_type, material);
        let index = self.balls.push(BallEntity { body, radius })?;
        Some(BallHandle { index, body })
    }

    /// Hinges `body_a` to `body_b` at `world_pivot`.
    ///
    /// Returns `None` if the joint collection is full or either body is not in
    /// `world`.
    pub fn create_joint(
        &mut self,
        world: &mut PhysicsWorld2D,
        body_a: RigidBodyHandle,
        body_b: RigidBodyHandle,
        world_pivot: Point2<f32>,
        limits: AngleLimits,
    ) -> Option<JointHandle> {
        if self.joints.is_full() {
            log::trace!("joint collection full, dropping joint at {world_pivot:?}");
            return None;
        }
        let anchor_a = world.local_point(body_a, world_pivot)?;
        let anchor_b = world.local_point(body_b, world_pivot)?;
        let joint = world.add_revolute_joint(body_a, body_b, anchor_a, anchor_b, limits);
        let index = self.joints.push(JointEntity { joint, limits })?;
        Some(JointHandle { index, joint })
    }

    /// Forgets every entity. Only valid together with dropping the world.
    pub fn reset(&mut self) {
        self.layout_boxes.clear();
        self.boxes.clear();
        self.balls.clear();
        self.joints.clear();
    }

    pub fn counts(&self) -> RegistryCounts {
        RegistryCounts {
            layout_boxes: self.layout_boxes.len(),
            boxes: self.boxes.len(),
            balls: self.balls.len(),
            joints: self.joints.len(),
        }
    }

    #[inline]
    pub fn layout_boxes(&self) -> &Bounded<BoxEntity> {
        &self.layout_boxes
    }

    #[inline]
    pub fn boxes(&self) -> &Bounded<BoxEntity> {
        &self.boxes
    }

    #[inline]
    pub fn balls(&self) -> &Bounded<BallEntity> {
        &self.balls
    }

    #[inline]
    pub fn joints(&self) -> &Bounded<JointEntity> {
        &self.joints
    }

    pub fn get_box(&self, handle: BoxHandle) -> Option<&BoxEntity> {
        self.box_collection(handle.collection).get(handle.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{point, vector};

    fn world() -> PhysicsWorld2D {
        PhysicsWorld2D::new(vector![0.0, -10.0])
    }

    fn small_caps() -> Capacities {
        Capacities { boxes: 2, layout_boxes: 3, balls: 1, joints: 1 }
    }

    #[test]
    fn bounded_push_stops_at_capacity() {
        let mut b = Bounded::with_capacity(2);
        assert_eq!(b.push('a'), Some(0));
        assert_eq!(b.push('b'), Some(1));
        assert_eq!(b.push('c'), None);
        assert_eq!(b.len(), 2);
        assert_eq!(b.remaining(), 0);
        assert_eq!(b.iter().collect::<String>(), "ab");
    }

    #[test]
    fn full_collection_drops_without_touching_world() {
        let mut world = world();
        let mut reg = EntityRegistry::new(small_caps());
        let size = vector![1.0, 1.0];

        for i in 0..2 {
            let h = reg
                .create_box(&mut world, BoxCollection::Spawned, vector![i as f32, 5.0], size, Material::default(), BodyType::Dynamic)
                .unwrap();
            assert_eq!(h.index, i);
        }
        assert!(reg
            .create_box(&mut world, BoxCollection::Spawned, vector![9.0, 5.0], size, Material::default(), BodyType::Dynamic)
            .is_none());

        assert_eq!(reg.counts().boxes, 2);
        assert_eq!(world.body_count(), 2);

        // The layout collection has its own budget.
        assert!(reg
            .create_box(&mut world, BoxCollection::Layout, vector![0.0, 0.0], size, Material::default(), BodyType::Static)
            .is_some());
        assert_eq!(reg.counts().layout_boxes, 1);
    }

    #[test]
    fn half_extents_are_cached() {
        let mut world = world();
        let mut reg = EntityRegistry::new(small_caps());
        let h = reg
            .create_box(&mut world, BoxCollection::Layout, vector![8.0, 1.0], vector![32.0, 0.5], Material::default(), BodyType::Static)
            .unwrap();
        assert_eq!(reg.get_box(h).unwrap().half_extents, vector![16.0, 0.25]);
        assert_eq!(world.get_transform(h.body).unwrap().0, vector![8.0, 1.0]);
    }

    #[test]
    fn bottom_anchored_box_rests_on_given_height() {
        let mut world = world();
        let mut reg = EntityRegistry::new(small_caps());
        let h = reg
            .create_box_anchored_at_bottom(
                &mut world,
                BoxCollection::Layout,
                vector![3.0, 1.25],
                vector![0.2, 1.0],
                Material::default(),
                BodyType::Dynamic,
            )
            .unwrap();
        let (pos, _) = world.get_transform(h.body).unwrap();
        assert!((pos - vector![3.0, 1.75]).norm() < 1e-6);
    }

    #[test]
    fn ball_capacity_is_enforced() {
        let mut world = world();
        let mut reg = EntityRegistry::new(small_caps());
        let ball = reg.create_ball(&mut world, vector![1.0, 4.0], 0.25, Material::default(), BodyType::Dynamic);
        assert_eq!(ball.map(|b| b.index), Some(0));
        assert!(reg.create_ball(&mut world, vector![2.0, 4.0], 0.25, Material::default(), BodyType::Dynamic).is_none());
        assert_eq!(reg.balls().get(0).unwrap().radius, 0.25);
    }

    #[test]
    fn joint_anchors_meet_at_pivot() {
        let mut world = world();
        let mut reg = EntityRegistry::new(small_caps());
        let a = reg
            .create_box(&mut world, BoxCollection::Layout, vector![2.0, 1.0], vector![0.5, 2.0], Material::default(), BodyType::Static)
            .unwrap();
        let b = reg
            .create_box(&mut world, BoxCollection::Layout, vector![2.0, 2.0], vector![4.0, 0.2], Material::default(), BodyType::Dynamic)
            .unwrap();

        let j = reg
            .create_joint(&mut world, a.body, b.body, point![2.0, 2.0], AngleLimits::degrees(-26.0, 45.0))
            .unwrap();
        let anchor = world.joint_anchor(j.joint).unwrap();
        assert!((anchor - point![2.0, 2.0]).norm() < 1e-5);

        // Joint capacity is 1.
        assert!(reg.create_joint(&mut world, a.body, b.body, point![2.0, 2.0], AngleLimits::weld()).is_none());
        assert_eq!(world.joint_count(), 1);
    }

    #[test]
    fn reset_zeroes_every_count() {
        let mut world = world();
        let mut reg = EntityRegistry::new(small_caps());
        reg.create_box(&mut world, BoxCollection::Spawned, vector![0.0, 0.0], vector![1.0, 1.0], Material::default(), BodyType::Dynamic);
        reg.create_ball(&mut world, vector![0.0, 2.0], 0.5, Material::default(), BodyType::Dynamic);
        assert!(!reg.counts().is_zero());
        reg.reset();
        assert!(reg.counts().is_zero());
    }
}
