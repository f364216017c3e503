// src/input.rs
// Input state fed from winit window events and drained once per frame.
//
// Keys and buttons keep a held flag plus a "pressed since last frame" edge, so
// a tap that starts and ends between two frames still registers.

use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Keyboard bindings.
pub const KEY_PAUSE: KeyCode = KeyCode::KeyP;
pub const KEY_RESTART: KeyCode = KeyCode::KeyR;
pub const KEY_CLOSE: KeyCode = KeyCode::Escape;

/// What the session sees of input for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    /// Pointer position in screen pixels.
    pub pointer: Vec2,
    /// Spawn button held this frame.
    pub spawn_held: bool,
    /// Spawn button went down this frame.
    pub spawn_pressed: bool,
    pub toggle_pause: bool,
    pub restart: bool,
    pub close: bool,
}

#[derive(Debug, Default)]
pub struct InputState {
    pointer: Vec2,
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    left_down: bool,
    left_pressed: bool,
    close_requested: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one window event. Returns true if it was an input event.
    pub fn process_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(position.x as f32, position.y as f32);
                true
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                self.mouse_left(*state);
                true
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if !event.repeat {
                        self.key(code, event.state);
                    }
                }
                true
            }
            WindowEvent::CloseRequested => {
                self.close_requested = true;
                true
            }
            _ => false,
        }
    }

    // ---------------- Raw updates ----------------

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer = Vec2::new(x, y);
    }

    pub fn mouse_left(&mut self, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.left_down {
                    self.left_pressed = true;
                }
                self.left_down = true;
            }
            ElementState::Released => self.left_down = false,
        }
    }

    pub fn key(&mut self, code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if self.keys_down.insert(code) {
                    self.keys_pressed.insert(code);
                }
            }
            ElementState::Released => {
                self.keys_down.remove(&code);
            }
        }
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    // ---------------- Per-frame snapshot ----------------

    /// Snapshot for this frame; clears the edge flags.
    pub fn frame(&mut self) -> FrameInput {
        let snapshot = FrameInput {
            pointer: self.pointer,
            spawn_held: self.left_down || self.left_pressed,
            spawn_pressed: self.left_pressed,
            toggle_pause: self.keys_pressed.contains(&KEY_PAUSE),
            restart: self.keys_pressed.contains(&KEY_RESTART),
            close: self.close_requested || self.keys_pressed.contains(&KEY_CLOSE),
        };
        self.left_pressed = false;
        self.keys_pressed.clear();
        snapshot
    }

    pub fn is_key_down(&self, code: KeyCode) -> bool {
        self.keys_down.contains(&code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_button_spawns_every_frame() {
        let mut input = InputState::new();
        input.pointer_moved(120.0, 40.0);
        input.mouse_left(ElementState::Pressed);

        let first = input.frame();
        assert!(first.spawn_held && first.spawn_pressed);
        assert_eq!(first.pointer, Vec2::new(120.0, 40.0));

        let second = input.frame();
        assert!(second.spawn_held);
        assert!(!second.spawn_pressed);

        input.mouse_left(ElementState::Released);
        assert!(!input.frame().spawn_held);
    }

    #[test]
    fn quick_click_between_frames_still_counts() {
        let mut input = InputState::new();
        input.mouse_left(ElementState::Pressed);
        input.mouse_left(ElementState::Released);
        let frame = input.frame();
        assert!(frame.spawn_held && frame.spawn_pressed);
        assert!(!input.frame().spawn_held);
    }

    #[test]
    fn key_edges_fire_once() {
        let mut input = InputState::new();
        input.key(KEY_PAUSE, ElementState::Pressed);
        input.key(KEY_PAUSE, ElementState::Pressed);
        assert!(input.frame().toggle_pause);
        assert!(!input.frame().toggle_pause);
        assert!(input.is_key_down(KEY_PAUSE));

        input.key(KEY_PAUSE, ElementState::Released);
        input.key(KEY_RESTART, ElementState::Pressed);
        let frame = input.frame();
        assert!(frame.restart && !frame.toggle_pause);
    }

    #[test]
    fn close_sticks() {
        let mut input = InputState::new();
        input.request_close();
        assert!(input.frame().close);
        assert!(input.frame().close);

        let mut input = InputState::new();
        input.key(KEY_CLOSE, ElementState::Pressed);
        assert!(input.frame().close);
    }
}
