//! Keyboard and mouse input source

use std::f32::consts::PI;

use glam::Vec2;
use winit::keyboard::KeyCode;

use super::{InputDevices, InputSource};
use crate::platform::keyboard::KeyboardState;
use crate::sim::PlayerIntent;

/// WASD moves, Space jumps, left mouse fires, the pointer aims
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyboardSource {
    /// Yaw with the pointer at the window centre
    pub yaw0: f32,
}

impl KeyboardSource {
    pub fn new(spawn_look: Vec2) -> Self {
        Self { yaw0: spawn_look.x }
    }

    /// (yaw, pitch) for the pointer position
    ///
    /// Both axes are scaled by the window height so a square pointer motion
    /// turns the same amount in both directions.
    pub fn pointer_look(&self, keyboard: &KeyboardState) -> Vec2 {
        let size = keyboard.window_size().as_vec2();
        let h = size.y.max(1.0);
        let cursor = keyboard.cursor();
        Vec2::new(
            self.yaw0 - PI * (cursor.x - size.x * 0.5) / h,
            -PI * (cursor.y - size.y * 0.5) / h,
        )
    }
}

fn key(keyboard: &KeyboardState, code: KeyCode) -> f32 {
    if keyboard.is_pressed(code) { 1.0 } else { 0.0 }
}

impl InputSource for KeyboardSource {
    fn sample(&mut self, devices: &InputDevices<'_>) -> PlayerIntent {
        let keyboard = devices.keyboard;
        PlayerIntent {
            left: key(keyboard, KeyCode::KeyA),
            right: key(keyboard, KeyCode::KeyD),
            forward: key(keyboard, KeyCode::KeyW),
            backward: key(keyboard, KeyCode::KeyS),
            jump: key(keyboard, KeyCode::Space),
            fire: if keyboard.mouse_left() { 1.0 } else { 0.0 },
            look: self.pointer_look(keyboard),
        }
    }
}
