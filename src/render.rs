// src/render.rs
//! Immediate-mode 2D drawing in screen pixels.
//!
//! The session draws through [`Canvas`]; [`ShapeBatch`] tessellates the calls
//! into coloured triangles that `gpu::GpuRenderer` uploads once per frame.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const RED: Color = Color::new(0.9, 0.16, 0.22, 1.0);
    pub const RED_TRANSLUCENT: Color = Color::new(1.0, 0.0, 0.0, 0.25);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Drawing primitives, all in screen pixels (Y-down).
pub trait Canvas {
    fn clear(&mut self, color: Color);

    /// A `size` rectangle centered on `center`, rotated `angle` radians
    /// clockwise about its center.
    fn rectangle(&mut self, center: Vec2, size: Vec2, angle: f32, color: Color);

    fn circle(&mut self, center: Vec2, radius: f32, color: Color);

    fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color);
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

const CIRCLE_SEGMENTS: usize = 24;

/// CPU-side triangle list for one frame.
#[derive(Debug, Default)]
pub struct ShapeBatch {
    clear: Option<Color>,
    vertices: Vec<Vertex>,
}

impl ShapeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties the batch but keeps its allocation.
    pub fn reset(&mut self) {
        self.clear = None;
        self.vertices.clear();
    }

    #[inline]
    pub fn clear_color(&self) -> Option<Color> {
        self.clear
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Vertices mapped from pixels into clip space for a `viewport` surface.
    pub fn to_clip_space(&self, viewport: Vec2) -> Vec<Vertex> {
        self.vertices
            .iter()
            .map(|v| Vertex {
                position: [
                    v.position[0] / viewport.x * 2.0 - 1.0,
                    1.0 - v.position[1] / viewport.y * 2.0,
                ],
                color: v.color,
            })
            .collect()
    }

    fn triangle(&mut self, a: Vec2, b: Vec2, c: Vec2, color: Color) {
        let color = color.to_array();
        for p in [a, b, c] {
            self.vertices.push(Vertex { position: p.to_array(), color });
        }
    }

    fn quad(&mut self, corners: [Vec2; 4], color: Color) {
        self.triangle(corners[0], corners[1], corners[2], color);
        self.triangle(corners[0], corners[2], corners[3], color);
    }
}

impl Canvas for ShapeBatch {
    fn clear(&mut self, color: Color) {
        self.clear = Some(color);
    }

    fn rectangle(&mut self, center: Vec2, size: Vec2, angle: f32, color: Color) {
        let half = size * 0.5;
        // Screen Y points down, so a positive angle turns clockwise on screen.
        let rot = Vec2::from_angle(angle);
        let corners = [
            Vec2::new(-half.x, -half.y),
            Vec2::new(half.x, -half.y),
            Vec2::new(half.x, half.y),
            Vec2::new(-half.x, half.y),
        ]
        .map(|c| center + rot.rotate(c));
        self.quad(corners, color);
    }

    fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        let step = std::f32::consts::TAU / CIRCLE_SEGMENTS as f32;
        for i in 0..CIRCLE_SEGMENTS {
            let a = center + Vec2::from_angle(step * i as f32) * radius;
            let b = center + Vec2::from_angle(step * (i + 1) as f32) * radius;
            self.triangle(center, a, b, color);
        }
    }

    fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color) {
        let dir = (to - from).normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        let n = dir.perp() * (thickness * 0.5);
        self.quad([from + n, to + n, to - n, from - n], color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 2], b: Vec2) -> bool {
        (Vec2::from(a) - b).length() < 1e-3
    }

    #[test]
    fn unrotated_rectangle_is_axis_aligned() {
        let mut batch = ShapeBatch::new();
        batch.rectangle(Vec2::new(100.0, 50.0), Vec2::new(20.0, 10.0), 0.0, Color::WHITE);
        assert_eq!(batch.triangle_count(), 2);
        let v = batch.vertices();
        assert!(close(v[0].position, Vec2::new(90.0, 45.0)));
        assert!(close(v[2].position, Vec2::new(110.0, 55.0)));
    }

    #[test]
    fn rectangle_rotates_about_center() {
        let mut batch = ShapeBatch::new();
        batch.rectangle(Vec2::new(0.0, 0.0), Vec2::new(4.0, 2.0), std::f32::consts::FRAC_PI_2, Color::WHITE);
        // (-2, -1) turned a quarter turn lands on (1, -2).
        assert!(close(batch.vertices()[0].position, Vec2::new(1.0, -2.0)));
    }

    #[test]
    fn circle_and_line_tessellate() {
        let mut batch = ShapeBatch::new();
        batch.circle(Vec2::new(10.0, 10.0), 5.0, Color::RED);
        assert_eq!(batch.triangle_count(), CIRCLE_SEGMENTS);
        batch.line(Vec2::ZERO, Vec2::new(10.0, 0.0), 2.0, Color::BLACK);
        assert_eq!(batch.triangle_count(), CIRCLE_SEGMENTS + 2);
        // Degenerate lines draw nothing.
        batch.line(Vec2::ONE, Vec2::ONE, 2.0, Color::BLACK);
        assert_eq!(batch.triangle_count(), CIRCLE_SEGMENTS + 2);
    }

    #[test]
    fn clip_space_corners() {
        let mut batch = ShapeBatch::new();
        batch.clear(Color::BLACK);
        batch.line(Vec2::new(0.0, 200.0), Vec2::new(800.0, 200.0), 0.0001, Color::WHITE);
        let clip = batch.to_clip_space(Vec2::new(800.0, 400.0));
        assert!((clip[0].position[0] + 1.0).abs() < 1e-5);
        assert!(clip[0].position[1].abs() < 1e-3);
        assert!((clip[1].position[0] - 1.0).abs() < 1e-5);
        assert_eq!(batch.clear_color(), Some(Color::BLACK));

        batch.reset();
        assert!(batch.vertices().is_empty());
        assert_eq!(batch.clear_color(), None);
    }
}
