//! Keyboard and pointer state tracked from window events

use std::collections::HashSet;

use glam::{UVec2, Vec2};
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

/// What a window event means for the frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Quit,
}

/// Held keys, modifiers, pointer and window size
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<KeyCode>,
    modifiers: ModifiersState,
    cursor: Vec2,
    mouse_left: bool,
    window_size: UVec2,
}

impl KeyboardState {
    pub fn new(window_size: UVec2) -> Self {
        Self {
            window_size,
            ..Self::default()
        }
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    pub fn press(&mut self, key: KeyCode) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.pressed.remove(&key);
    }

    pub fn set_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    /// Pointer position in window pixels, top-left origin
    pub fn cursor(&self) -> Vec2 {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: Vec2) {
        self.cursor = cursor;
    }

    pub fn mouse_left(&self) -> bool {
        self.mouse_left
    }

    pub fn set_mouse_left(&mut self, pressed: bool) {
        self.mouse_left = pressed;
    }

    pub fn window_size(&self) -> UVec2 {
        self.window_size
    }

    pub fn set_window_size(&mut self, size: UVec2) {
        self.window_size = size;
    }

    /// Update from a window event
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> KeyAction {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(code) = event.physical_key else {
                    return KeyAction::None;
                };
                match event.state {
                    ElementState::Pressed => {
                        self.press(code);
                        if is_quit(code, self.modifiers) {
                            return KeyAction::Quit;
                        }
                    }
                    ElementState::Released => self.release(code),
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => self.set_modifiers(modifiers.state()),
            WindowEvent::CursorMoved { position, .. } => {
                self.set_cursor(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => self.set_mouse_left(*state == ElementState::Pressed),
            WindowEvent::Resized(size) => {
                self.set_window_size(UVec2::new(size.width, size.height));
            }
            WindowEvent::Focused(false) => {
                // Release events are lost while unfocused
                self.pressed.clear();
                self.mouse_left = false;
            }
            _ => {}
        }
        KeyAction::None
    }
}

/// `Q` with no modifier held quits
pub fn is_quit(code: KeyCode, modifiers: ModifiersState) -> bool {
    code == KeyCode::KeyQ && modifiers.is_empty()
}
