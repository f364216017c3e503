// src/lib.rs
//! RayBox2D: a 2D rigid-body sandbox. Rapier does the physics, winit + wgpu
//! put it on screen. Hold the left mouse button to spawn boxes, `P` pauses,
//! `R` rebuilds the scene, `Escape` quits.

pub mod config;
pub mod coords;
pub mod error;
pub mod gpu;
pub mod input;
pub mod overlay;
pub mod physics;
pub mod registry;
pub mod render;
pub mod scene;
pub mod session;
pub mod spawn;
pub mod timing;

pub use config::SandboxConfig;
pub use error::{Error, Result};
pub use session::{Session, SessionState};

use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::gpu::GpuRenderer;
use crate::input::InputState;
use crate::render::ShapeBatch;

/// Runs the sandbox until the window closes.
#[cfg(not(target_arch = "wasm32"))]
pub fn run_native(config: SandboxConfig) -> Result<()> {
    let event_loop = EventLoop::new()?;
    let mut app = SandboxApp::new(config);
    event_loop.run_app(&mut app)?;
    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

// ----------------------------------------------------------------------------
// winit 0.30 + wgpu 22 App State
// ----------------------------------------------------------------------------
struct SandboxApp {
    config: SandboxConfig,

    // Created inside the `resumed` event
    window: Option<Arc<Window>>,
    renderer: Option<GpuRenderer>,
    session: Option<Session>,

    input: InputState,
    batch: ShapeBatch,
    title: String,
    error: Option<Error>,
}

impl SandboxApp {
    fn new(config: SandboxConfig) -> Self {
        Self {
            title: config.window.title.clone(),
            config,
            window: None,
            renderer: None,
            session: None,
            input: InputState::new(),
            batch: ShapeBatch::new(),
            error: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.window.width, self.config.window.height))
            .with_resizable(false);
        let window = Arc::new(event_loop.create_window(attrs)?);

        let renderer = pollster::block_on(GpuRenderer::new(window.clone()))
            .map_err(|e| e.context("initialising GPU renderer"))?;
        let session = Session::new(self.config.clone(), renderer.size());

        self.window = Some(window);
        self.renderer = Some(renderer);
        self.session = Some(session);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(session), Some(renderer)) = (self.session.as_mut(), self.renderer.as_mut()) else {
            return;
        };

        let input = self.input.frame();
        self.batch.reset();
        let state = session.frame(&input, Instant::now(), &mut self.batch);
        if state == SessionState::Closed {
            event_loop.exit();
            return;
        }
        renderer.render(&self.batch);

        if self.config.overlay.in_title && session.overlay_text() != self.title {
            self.title.clear();
            self.title.push_str(session.overlay_text());
            if let Some(window) = self.window.as_ref() {
                window.set_title(&format!("{} | {}", self.config.window.title, self.title));
            }
        }
    }
}

impl ApplicationHandler for SandboxApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);

        if self.window.is_some() {
            return;
        }

        if let Err(err) = self.init(event_loop) {
            log::error!("{err}");
            self.error = Some(err);
            event_loop.exit();
            return;
        }
        log::info!("Window ready, scene built");
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.as_ref() else { return };
        if window.id() != window_id {
            return;
        }

        if self.input.process_event(&event) {
            return;
        }

        match event {
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = self.renderer.as_mut() {
                    renderer.resize(new_size.width, new_size.height);
                }
                if let Some(session) = self.session.as_mut() {
                    session.resize(Vec2::new(new_size.width as f32, new_size.height as f32));
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                log::debug!("Scale factor changed: {}", scale_factor);
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(session) = self.session.as_mut() {
            session.close();
        }
    }
}
