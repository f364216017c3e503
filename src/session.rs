// src/session.rs
//! One sandbox run and its lifecycle.
//!
//! ```text
//! Building -> Running -> Restarting -> Building -> ... -> Closed
//! ```
//!
//! Each frame runs input, then the physics step (unless paused), then drawing.
//! The session owns the physics world outright; restarting drops it, which
//! destroys every body and joint at once.

use std::time::Instant;

use glam::Vec2;
use nalgebra::{Point2, Vector2};

use crate::config::SandboxConfig;
use crate::coords::CoordinateMapper;
use crate::input::FrameInput;
use crate::overlay::{DebugOverlay, OverlayStats};
use crate::physics::{BodyType, Material, PhysicsWorld2D};
use crate::registry::{BoxCollection, BoxEntity, EntityRegistry, RegistryCounts};
use crate::render::{Canvas, Color};
use crate::scene::{build_layout, LayoutSummary};
use crate::spawn::{SpawnController, SpawnOutcome};
use crate::timing::{FpsCounter, FrameTimer, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Building,
    Running,
    Restarting,
    Closed,
}

/// Joint anchor marker radius in pixels.
const JOINT_MARKER_RADIUS: f32 = 10.0;
const DIAGONAL_THICKNESS: f32 = 2.0;

pub struct Session {
    config: SandboxConfig,
    state: SessionState,
    window_size: Vec2,
    mapper: CoordinateMapper,
    /// `None` only while restarting or once closed.
    world: Option<PhysicsWorld2D>,
    registry: EntityRegistry,
    spawner: SpawnController,
    paused: bool,
    frame: u64,
    runs: u32,
    timer: FrameTimer,
    fps: FpsCounter,
    overlay: DebugOverlay,
    last_layout: LayoutSummary,
}

impl Session {
    /// Builds the first world for a window of `window_size` pixels.
    pub fn new(config: SandboxConfig, window_size: Vec2) -> Self {
        let mapper = CoordinateMapper::new(config.window.ppm, window_size.y);
        let mut session = Self {
            registry: EntityRegistry::new(config.capacities),
            spawner: SpawnController::new(&config.spawn),
            paused: config.physics.start_paused,
            overlay: DebugOverlay::new(config.overlay.refresh_every),
            state: SessionState::Building,
            window_size,
            mapper,
            world: None,
            frame: 0,
            runs: 0,
            timer: FrameTimer::new(),
            fps: FpsCounter::new(),
            last_layout: LayoutSummary::default(),
            config,
        };
        session.build();
        session
    }

    /// Building: fresh world, scene, optional pre-spawned box.
    fn build(&mut self) {
        debug_assert!(self.world.is_none());
        self.state = SessionState::Building;
        self.runs += 1;

        self.mapper = CoordinateMapper::new(self.config.window.ppm, self.window_size.y);
        let gravity = Vector2::new(0.0, self.config.physics.gravity_y);
        let mut world = PhysicsWorld2D::new(gravity);
        let world_size = self.mapper.world_size(self.window_size);
        self.last_layout = build_layout(&mut world, &mut self.registry, world_size, &self.config.layout);

        if self.config.physics.prespawn {
            let spawn = &self.config.spawn;
            let at = Vector2::new(world_size.x / 2.0, world_size.y * 0.75);
            self.registry.create_box(
                &mut world,
                BoxCollection::Spawned,
                at,
                Vector2::new(spawn.width, spawn.height),
                Material { density: spawn.density, friction: spawn.friction },
                BodyType::Dynamic,
            );
        }

        log::info!(
            "Session #{} built: {} layout boxes, {} joints, {} balls, {} bodies, {} colliders",
            self.runs,
            self.last_layout.layout_boxes,
            self.last_layout.joints,
            self.last_layout.balls,
            world.body_count(),
            world.collider_count(),
        );
        self.world = Some(world);
        self.state = SessionState::Running;
    }

    /// Restarting: drop the world and every entity. Counts read zero until
    /// the next build.
    fn teardown(&mut self) {
        self.state = SessionState::Restarting;
        if let Some(world) = self.world.take() {
            log::info!("Tearing down world with {} bodies", world.body_count());
        }
        self.registry.reset();
        self.spawner.reset();
    }

    /// Records a new window size. The mapper keeps the old height until the
    /// next build, so coordinates stay stable for the running world.
    pub fn resize(&mut self, window_size: Vec2) {
        self.window_size = window_size;
    }

    /// Restarts the simulation: teardown, then rebuild.
    pub fn restart(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.teardown();
        self.build();
    }

    /// Closed: terminal.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.world = None;
        self.registry.reset();
        self.state = SessionState::Closed;
        log::info!("Session closed after {} frames", self.frame);
    }

    /// Runs one frame: input -> physics -> draw. Returns the state afterwards.
    pub fn frame(&mut self, input: &FrameInput, now: Instant, canvas: &mut dyn Canvas) -> SessionState {
        if self.state == SessionState::Closed {
            return self.state;
        }
        self.fps.tick();
        self.frame += 1;

        self.timer.begin(Phase::Input);
        self.handle_input(input, now);
        self.timer.end(Phase::Input);

        match self.state {
            SessionState::Closed => return self.state,
            SessionState::Restarting => {
                self.teardown();
                self.build();
            }
            _ => {}
        }

        self.timer.begin(Phase::Physics);
        if !self.paused {
            self.step();
        }
        self.timer.end(Phase::Physics);

        self.timer.begin(Phase::Draw);
        self.draw(canvas);
        self.timer.end(Phase::Draw);

        let stats = OverlayStats {
            frame: self.frame,
            counts: self.registry.counts(),
            box_capacity: self.registry.boxes().capacity(),
            paused: self.paused,
        };
        self.overlay.update(&stats, &self.fps, &self.timer);
        self.state
    }

    fn handle_input(&mut self, input: &FrameInput, now: Instant) {
        if input.close {
            self.close();
            return;
        }
        if input.restart {
            self.state = SessionState::Restarting;
            return;
        }
        if input.toggle_pause {
            self.paused = !self.paused;
            log::info!("Simulation {}", if self.paused { "paused" } else { "resumed" });
        }
        if input.spawn_pressed {
            log::debug!("pointer at world {:?}", self.mapper.screen_to_world(input.pointer));
        }
        if input.spawn_held {
            self.spawn_at(input.pointer, now);
        }
    }

    /// Spawn request at a screen position.
    pub fn spawn_at(&mut self, pointer: Vec2, now: Instant) -> SpawnOutcome {
        let Some(world) = self.world.as_mut() else {
            return SpawnOutcome::AtCapacity;
        };
        self.spawner.request(now, pointer, &self.mapper, world, &mut self.registry)
    }

    /// Advances physics by one fixed time step.
    pub fn step(&mut self) {
        if let Some(world) = self.world.as_mut() {
            world.step(self.config.physics.time_step, self.config.physics.sub_steps);
        }
    }

    /// Draws the current entity set.
    pub fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.clear(Color::BLACK);
        let Some(world) = self.world.as_ref() else {
            return;
        };

        for b in self.registry.layout_boxes().iter().chain(self.registry.boxes().iter()) {
            self.draw_box(world, b, canvas);
        }

        for ball in self.registry.balls() {
            if let Some((pos, _)) = world.get_transform(ball.body) {
                let radius = self.mapper.to_pixels(ball.radius);
                canvas.circle(self.mapper.world_to_screen(pos), radius, Color::RED);
            }
        }

        for joint in self.registry.joints() {
            if let Some(anchor) = world.joint_anchor(joint.joint) {
                canvas.circle(self.mapper.world_to_screen(anchor.coords), JOINT_MARKER_RADIUS, Color::RED_TRANSLUCENT);
            }
        }
    }

    fn draw_box(&self, world: &PhysicsWorld2D, b: &BoxEntity, canvas: &mut dyn Canvas) {
        let Some((pos, angle)) = world.get_transform(b.body) else {
            return;
        };
        let size = Vec2::new(self.mapper.to_pixels(2.0 * b.half_extents.x), self.mapper.to_pixels(2.0 * b.half_extents.y));
        canvas.rectangle(self.mapper.world_to_screen(pos), size, CoordinateMapper::screen_angle(angle), Color::WHITE);

        if self.config.overlay.draw_box_diagonals {
            let h = b.half_extents;
            let corner = |x: f32, y: f32| {
                world
                    .world_point(b.body, Point2::new(x, y))
                    .map(|p| self.mapper.world_to_screen(p.coords))
            };
            if let (Some(bl), Some(tr), Some(br), Some(tl)) =
                (corner(-h.x, -h.y), corner(h.x, h.y), corner(h.x, -h.y), corner(-h.x, h.y))
            {
                canvas.line(bl, tr, DIAGONAL_THICKNESS, Color::BLACK);
                canvas.line(br, tl, DIAGONAL_THICKNESS, Color::BLACK);
            }
        }
    }

    // ---------------- Accessors ----------------

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn counts(&self) -> RegistryCounts {
        self.registry.counts()
    }

    #[inline]
    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    #[inline]
    pub fn world(&self) -> Option<&PhysicsWorld2D> {
        self.world.as_ref()
    }

    #[inline]
    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    /// How many worlds have been built, including the current one.
    #[inline]
    pub fn runs(&self) -> u32 {
        self.runs
    }

    #[inline]
    pub fn last_layout(&self) -> LayoutSummary {
        self.last_layout
    }

    #[inline]
    pub fn overlay_text(&self) -> &str {
        self.overlay.text()
    }

    #[inline]
    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ShapeBatch;
    use std::time::Duration;

    fn session() -> Session {
        Session::new(SandboxConfig::default(), Vec2::new(800.0, 400.0))
    }

    #[test]
    fn new_session_is_running_with_scene() {
        let s = session();
        assert_eq!(s.state(), SessionState::Running);
        let counts = s.counts();
        assert_eq!(counts.layout_boxes, 15);
        assert_eq!(counts.balls, 1);
        assert_eq!(counts.joints, 2);
        assert_eq!(counts.boxes, 1); // pre-spawned
        assert_eq!(s.runs(), 1);
    }

    #[test]
    fn teardown_zeroes_counts_and_drops_world() {
        let mut s = session();
        s.teardown();
        assert_eq!(s.state(), SessionState::Restarting);
        assert!(s.counts().is_zero());
        assert!(s.world().is_none());
        // Nothing to spawn into until the next build.
        assert_eq!(s.spawn_at(Vec2::new(10.0, 10.0), Instant::now()), SpawnOutcome::AtCapacity);

        s.build();
        assert_eq!(s.state(), SessionState::Running);
        assert_eq!(s.runs(), 2);
        assert_eq!(s.counts(), session().counts());
        assert_eq!(s.world().unwrap().body_count(), 17);
        assert_eq!(s.world().unwrap().collider_count(), 17);
    }

    #[test]
    fn paused_session_does_not_move_bodies() {
        let mut config = SandboxConfig::default();
        config.physics.start_paused = true;
        let mut s = Session::new(config, Vec2::new(800.0, 400.0));
        let ball = s.registry().balls().get(0).unwrap().body;
        let before = s.world().unwrap().get_transform(ball).unwrap();

        let mut batch = ShapeBatch::new();
        for _ in 0..5 {
            s.frame(&FrameInput::default(), Instant::now(), &mut batch);
        }
        assert_eq!(s.world().unwrap().get_transform(ball).unwrap(), before);

        s.frame(&FrameInput { toggle_pause: true, ..FrameInput::default() }, Instant::now(), &mut batch);
        assert!(!s.is_paused());
        let after = s.world().unwrap().get_transform(ball).unwrap();
        assert!(after.0.y < before.0.y);
    }

    #[test]
    fn held_pointer_respects_cooldown() {
        let mut s = session();
        let mut batch = ShapeBatch::new();
        let t0 = Instant::now();
        let held = FrameInput { pointer: Vec2::new(400.0, 100.0), spawn_held: true, ..FrameInput::default() };

        s.frame(&held, t0, &mut batch);
        s.frame(&held, t0 + Duration::from_millis(16), &mut batch);
        s.frame(&held, t0 + Duration::from_millis(120), &mut batch);
        // One pre-spawned plus two accepted requests.
        assert_eq!(s.counts().boxes, 3);
    }

    #[test]
    fn draw_emits_every_entity() {
        let s = session();
        let mut batch = ShapeBatch::new();
        s.draw(&mut batch);
        assert_eq!(batch.clear_color(), Some(Color::BLACK));
        // 16 boxes * 2 + 1 ball * 24 + 2 joints * 24
        assert_eq!(batch.triangle_count(), 16 * 2 + 24 + 2 * 24);
    }

    #[test]
    fn resize_applies_on_restart() {
        let mut s = session();
        s.resize(Vec2::new(800.0, 600.0));
        assert_eq!(s.mapper().window_height(), 400.0);
        s.restart();
        assert_eq!(s.mapper().window_height(), 600.0);
        let wall = s.registry().layout_boxes().get(1).unwrap();
        // Left wall spans the new 12 m height.
        assert_eq!(wall.half_extents.y, 6.0);
    }

    #[test]
    fn close_is_terminal() {
        let mut s = session();
        let mut batch = ShapeBatch::new();
        let state = s.frame(&FrameInput { close: true, restart: true, ..FrameInput::default() }, Instant::now(), &mut batch);
        assert_eq!(state, SessionState::Closed);
        assert!(s.world().is_none());
        s.restart();
        assert_eq!(s.state(), SessionState::Closed);
        assert_eq!(s.frame(&FrameInput::default(), Instant::now(), &mut batch), SessionState::Closed);
    }
}
