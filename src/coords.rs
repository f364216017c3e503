// src/coords.rs
//! World frame (Y-up, metres, nalgebra) <-> screen frame (Y-down, pixels, glam).

use glam::Vec2;
use nalgebra::Vector2;

/// Converts between world and screen space with a fixed pixels-per-metre
/// scale and the window height captured when the session was built.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    ppm: f32,
    window_height: f32,
}

impl CoordinateMapper {
    pub fn new(ppm: f32, window_height: f32) -> Self {
        debug_assert!(ppm > 0.0);
        Self { ppm, window_height }
    }

    #[inline(always)]
    pub fn ppm(&self) -> f32 {
        self.ppm
    }

    #[inline(always)]
    pub fn window_height(&self) -> f32 {
        self.window_height
    }

    #[inline(always)]
    pub fn world_to_screen(&self, world: Vector2<f32>) -> Vec2 {
        Vec2::new(world.x * self.ppm, self.window_height - world.y * self.ppm)
    }

    #[inline(always)]
    pub fn screen_to_world(&self, screen: Vec2) -> Vector2<f32> {
        Vector2::new(screen.x / self.ppm, (self.window_height - screen.y) / self.ppm)
    }

    /// World-space extent of a window of `window` pixels.
    #[inline]
    pub fn world_size(&self, window: Vec2) -> Vector2<f32> {
        Vector2::new(window.x / self.ppm, window.y / self.ppm)
    }

    /// Metres to pixels.
    #[inline(always)]
    pub fn to_pixels(&self, metres: f32) -> f32 {
        metres * self.ppm
    }

    /// A counter-clockwise world angle becomes clockwise on screen.
    #[inline(always)]
    pub fn screen_angle(world_radians: f32) -> f32 {
        -world_radians
    }
}
