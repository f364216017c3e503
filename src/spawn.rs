// src/spawn.rs
//! Cooldown- and capacity-gated spawning of dynamic boxes under the pointer.

use std::time::{Duration, Instant};

use glam::Vec2;
use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SpawnConfig;
use crate::coords::CoordinateMapper;
use crate::physics::{BodyType, Material, PhysicsWorld2D};
use crate::registry::{BoxCollection, EntityRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnState {
    Ready,
    CoolingDown,
}

/// Result of one spawn request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// This many boxes were created (at least one).
    Spawned(usize),
    /// Dropped: the previous spawn was too recent.
    CoolingDown,
    /// Dropped: the spawned-box collection is full.
    AtCapacity,
}

impl SpawnOutcome {
    #[inline]
    pub fn spawned(&self) -> usize {
        match *self {
            SpawnOutcome::Spawned(n) => n,
            _ => 0,
        }
    }
}

pub struct SpawnController {
    cooldown: Duration,
    size: Vector2<f32>,
    material: Material,
    batch: usize,
    jitter: f32,
    last_spawn: Option<Instant>,
    rng: StdRng,
}

impl SpawnController {
    pub fn new(config: &SpawnConfig) -> Self {
        Self {
            cooldown: config.cooldown(),
            size: Vector2::new(config.width, config.height),
            material: Material { density: config.density, friction: config.friction },
            batch: config.batch.max(1),
            jitter: config.jitter.max(0.0),
            last_spawn: None,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// `Ready` once strictly more than the cooldown has passed since the last spawn.
    pub fn state(&self, now: Instant) -> SpawnState {
        match self.last_spawn {
            Some(last) if now.saturating_duration_since(last) <= self.cooldown => SpawnState::CoolingDown,
            _ => SpawnState::Ready,
        }
    }

    /// Forget the cooldown, e.g. after the world is rebuilt.
    pub fn reset(&mut self) {
        self.last_spawn = None;
    }

    /// Handles one pointer-held request at screen position `pointer`.
    pub fn request(
        &mut self,
        now: Instant,
        pointer: Vec2,
        mapper: &CoordinateMapper,
        world: &mut PhysicsWorld2D,
        registry: &mut EntityRegistry,
    ) -> SpawnOutcome {
        if registry.boxes().is_full() {
            log::trace!("spawn dropped: {} boxes at capacity", registry.boxes().len());
            return SpawnOutcome::AtCapacity;
        }
        if self.state(now) == SpawnState::CoolingDown {
            return SpawnOutcome::CoolingDown;
        }

        let origin = mapper.screen_to_world(pointer);
        let mut created = 0;
        for i in 0..self.batch {
            let offset = if i == 0 || self.jitter == 0.0 {
                Vector2::zeros()
            } else {
                Vector2::new(
                    self.rng.gen_range(-self.jitter..=self.jitter),
                    self.rng.gen_range(-self.jitter..=self.jitter),
                )
            };
            let spawned = registry.create_box(
                world,
                BoxCollection::Spawned,
                origin + offset,
                self.size,
                self.material,
                BodyType::Dynamic,
            );
            if spawned.is_none() {
                break;
            }
            created += 1;
        }

        self.last_spawn = Some(now);
        log::trace!("spawned {created} box(es) at {origin:?}");
        SpawnOutcome::Spawned(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Capacities;
    use nalgebra::vector;

    const COOLDOWN: Duration = Duration::from_millis(100);

    fn setup(boxes: usize, batch: usize) -> (SpawnController, CoordinateMapper, PhysicsWorld2D, EntityRegistry) {
        let config = SpawnConfig { cooldown_ms: 100, batch, ..SpawnConfig::default() };
        let caps = Capacities { boxes, ..Capacities::default() };
        (
            SpawnController::new(&config),
            CoordinateMapper::new(50.0, 400.0),
            PhysicsWorld2D::new(vector![0.0, -10.0]),
            EntityRegistry::new(caps),
        )
    }

    #[test]
    fn second_request_inside_cooldown_is_dropped() {
        let (mut spawner, mapper, mut world, mut registry) = setup(1000, 1);
        let t0 = Instant::now();
        let eps = Duration::from_millis(10);
        let pointer = Vec2::new(400.0, 100.0);

        let first = spawner.request(t0, pointer, &mapper, &mut world, &mut registry);
        let second = spawner.request(t0 + eps, pointer, &mapper, &mut world, &mut registry);
        let third = spawner.request(t0 + COOLDOWN + eps, pointer, &mapper, &mut world, &mut registry);

        assert_eq!(first, SpawnOutcome::Spawned(1));
        assert_eq!(second, SpawnOutcome::CoolingDown);
        assert_eq!(third, SpawnOutcome::Spawned(1));
        assert_eq!(registry.counts().boxes, 2);
    }

    #[test]
    fn cooldown_boundary_is_exclusive() {
        let (mut spawner, mapper, mut world, mut registry) = setup(1000, 1);
        let t0 = Instant::now();
        spawner.request(t0, Vec2::ZERO, &mapper, &mut world, &mut registry);
        assert_eq!(spawner.state(t0 + COOLDOWN), SpawnState::CoolingDown);
        assert_eq!(spawner.state(t0 + COOLDOWN + Duration::from_micros(1)), SpawnState::Ready);
    }

    #[test]
    fn capacity_caps_total_spawns() {
        let n = 8;
        let (mut spawner, mapper, mut world, mut registry) = setup(n, 1);
        let t0 = Instant::now();
        let step = COOLDOWN + Duration::from_millis(1);

        let mut outcomes = Vec::new();
        for i in 0..(n + 5) as u32 {
            outcomes.push(spawner.request(t0 + step * i, Vec2::new(100.0, 100.0), &mapper, &mut world, &mut registry));
            assert!(registry.counts().boxes <= n);
        }

        assert_eq!(registry.counts().boxes, n);
        assert_eq!(outcomes.iter().map(SpawnOutcome::spawned).sum::<usize>(), n);
        assert!(outcomes[n..].iter().all(|o| *o == SpawnOutcome::AtCapacity));
    }

    #[test]
    fn at_capacity_wins_over_cooldown() {
        let (mut spawner, mapper, mut world, mut registry) = setup(1, 1);
        let t0 = Instant::now();
        spawner.request(t0, Vec2::ZERO, &mapper, &mut world, &mut registry);
        let dropped = spawner.request(t0, Vec2::ZERO, &mapper, &mut world, &mut registry);
        assert_eq!(dropped, SpawnOutcome::AtCapacity);
    }

    #[test]
    fn box_lands_under_pointer_in_world_space() {
        let (mut spawner, mapper, mut world, mut registry) = setup(10, 1);
        spawner.request(Instant::now(), Vec2::new(400.0, 200.0), &mapper, &mut world, &mut registry);
        let spawned = registry.boxes().get(0).unwrap();
        let (pos, _) = world.get_transform(spawned.body).unwrap();
        assert!((pos - vector![8.0, 4.0]).norm() < 1e-5);
        assert_eq!(spawned.half_extents, vector![0.05, 0.05]);
    }

    #[test]
    fn batch_is_truncated_by_capacity() {
        let (mut spawner, mapper, mut world, mut registry) = setup(5, 3);
        let t0 = Instant::now();
        assert_eq!(spawner.request(t0, Vec2::ZERO, &mapper, &mut world, &mut registry), SpawnOutcome::Spawned(3));
        let later = t0 + COOLDOWN * 2;
        assert_eq!(spawner.request(later, Vec2::ZERO, &mapper, &mut world, &mut registry), SpawnOutcome::Spawned(2));
        assert_eq!(registry.counts().boxes, 5);
        assert_eq!(world.body_count(), 5);
    }
}
