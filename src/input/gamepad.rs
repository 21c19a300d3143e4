//! Gamepad state registry and the gamepad input source
//!
//! The registry is plain data keyed by device id. The platform layer is its
//! only writer; input sources only read it.

use std::collections::BTreeMap;
use std::f32::consts::PI;

use glam::Vec2;

use super::curve::{axis_curve, signed_curve};
use super::{InputDevices, InputSource};
use crate::sim::PlayerIntent;

/// Look accumulator change per update at full stick deflection
pub const LOOK_RATE: f32 = 0.005;
/// Pitch accumulator limit (fraction of π)
pub const PITCH_LIMIT: f32 = 0.45;

/// Buttons the demo reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamepadButton {
    DPadUp,
    DPadDown,
    DPadLeft,
    DPadRight,
    /// Bottom face button (A on most layouts)
    South,
    RightBumper,
}

impl GamepadButton {
    pub const COUNT: usize = 6;

    fn index(self) -> usize {
        self as usize
    }
}

/// Stick axes; Y axes are positive when pushed down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamepadAxis {
    LeftX,
    LeftY,
    RightX,
    RightY,
}

impl GamepadAxis {
    pub const COUNT: usize = 4;

    fn index(self) -> usize {
        self as usize
    }
}

/// Latest button and axis values of one device
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GamepadState {
    buttons: [bool; GamepadButton::COUNT],
    axes: [f32; GamepadAxis::COUNT],
}

impl GamepadState {
    pub fn pressed(&self, button: GamepadButton) -> bool {
        self.buttons[button.index()]
    }

    pub fn axis(&self, axis: GamepadAxis) -> f32 {
        self.axes[axis.index()]
    }

    pub fn set_button(&mut self, button: GamepadButton, pressed: bool) {
        self.buttons[button.index()] = pressed;
    }

    pub fn set_axis(&mut self, axis: GamepadAxis, value: f32) {
        self.axes[axis.index()] = value.clamp(-1.0, 1.0);
    }

    /// Button wins over the stick, otherwise the dead-zone curve of `deflection`
    fn digital_or_curve(&self, button: GamepadButton, deflection: f32) -> f32 {
        if self.pressed(button) {
            1.0
        } else {
            axis_curve(deflection)
        }
    }
}

/// One connected device
#[derive(Debug, Clone, PartialEq)]
pub struct GamepadInfo {
    pub name: String,
    /// Has a standard gamepad mapping (joysticks without one are skipped)
    pub is_gamepad: bool,
    pub state: GamepadState,
}

/// Connected devices in ascending id order
#[derive(Debug, Clone, Default)]
pub struct GamepadRegistry {
    devices: BTreeMap<usize, GamepadInfo>,
}

impl GamepadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect(&mut self, id: usize, name: impl Into<String>, is_gamepad: bool) {
        self.devices.insert(
            id,
            GamepadInfo {
                name: name.into(),
                is_gamepad,
                state: GamepadState::default(),
            },
        );
    }

    pub fn disconnect(&mut self, id: usize) -> Option<GamepadInfo> {
        self.devices.remove(&id)
    }

    pub fn get(&self, id: usize) -> Option<&GamepadInfo> {
        self.devices.get(&id)
    }

    /// Mutable state of a connected device; `None` for unknown ids
    pub fn state_mut(&mut self, id: usize) -> Option<&mut GamepadState> {
        self.devices.get_mut(&id).map(|info| &mut info.state)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// State of the `index`-th gamepad-capable device
    pub fn nth_gamepad(&self, index: usize) -> Option<&GamepadState> {
        self.devices
            .values()
            .filter(|info| info.is_gamepad)
            .nth(index)
            .map(|info| &info.state)
    }
}

/// Reads the `index`-th connected gamepad
#[derive(Debug, Clone, PartialEq)]
pub struct GamepadSource {
    pub index: usize,
    /// Integrated right stick; angles are `-π * look`
    look: Vec2,
}

impl GamepadSource {
    /// Start with the accumulator matching `spawn_look` (yaw, pitch)
    pub fn new(index: usize, spawn_look: Vec2) -> Self {
        Self {
            index,
            look: -spawn_look / PI,
        }
    }

    /// Current (yaw, pitch) in radians
    pub fn look_angles(&self) -> Vec2 {
        -PI * self.look
    }
}

impl InputSource for GamepadSource {
    fn sample(&mut self, devices: &InputDevices<'_>) -> PlayerIntent {
        let Some(pad) = devices.gamepads.nth_gamepad(self.index) else {
            return PlayerIntent::idle(self.look_angles());
        };

        let lx = pad.axis(GamepadAxis::LeftX);
        let ly = pad.axis(GamepadAxis::LeftY);

        self.look.x += LOOK_RATE * signed_curve(pad.axis(GamepadAxis::RightX));
        self.look.y = (self.look.y + LOOK_RATE * signed_curve(pad.axis(GamepadAxis::RightY)))
            .clamp(-PITCH_LIMIT, PITCH_LIMIT);

        PlayerIntent {
            left: pad.digital_or_curve(GamepadButton::DPadLeft, -lx),
            right: pad.digital_or_curve(GamepadButton::DPadRight, lx),
            forward: pad.digital_or_curve(GamepadButton::DPadUp, -ly),
            backward: pad.digital_or_curve(GamepadButton::DPadDown, ly),
            jump: if pad.pressed(GamepadButton::South) { 1.0 } else { 0.0 },
            fire: if pad.pressed(GamepadButton::RightBumper) { 1.0 } else { 0.0 },
            look: self.look_angles(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::keyboard::KeyboardState;

    fn sample(source: &mut GamepadSource, registry: &GamepadRegistry) -> PlayerIntent {
        let keyboard = KeyboardState::default();
        source.sample(&InputDevices {
            keyboard: &keyboard,
            gamepads: registry,
        })
    }

    #[test]
    fn test_nth_gamepad_skips_plain_joysticks() {
        let mut registry = GamepadRegistry::new();
        registry.connect(3, "pad b", true);
        registry.connect(0, "flight stick", false);
        registry.connect(1, "pad a", true);
        registry.state_mut(3).unwrap().set_button(GamepadButton::South, true);

        assert!(!registry.nth_gamepad(0).unwrap().pressed(GamepadButton::South));
        assert!(registry.nth_gamepad(1).unwrap().pressed(GamepadButton::South));
        assert!(registry.nth_gamepad(2).is_none());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_disconnected_source_is_idle() {
        let registry = GamepadRegistry::new();
        let mut source = GamepadSource::new(0, Vec2::new(PI, 0.0));
        let intent = sample(&mut source, &registry);
        assert_eq!(intent.forward, 0.0);
        assert_eq!(intent.fire, 0.0);
        assert!((intent.look - Vec2::new(PI, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_dpad_overrides_stick() {
        let mut registry = GamepadRegistry::new();
        registry.connect(0, "pad", true);
        let state = registry.state_mut(0).unwrap();
        state.set_axis(GamepadAxis::LeftY, 0.55);
        state.set_button(GamepadButton::DPadUp, true);
        state.set_button(GamepadButton::RightBumper, true);

        let mut source = GamepadSource::new(0, Vec2::ZERO);
        let intent = sample(&mut source, &registry);
        assert_eq!(intent.forward, 1.0);
        assert!((intent.backward - 0.5).abs() < 1e-6);
        assert_eq!(intent.fire, 1.0);
        assert_eq!(intent.jump, 0.0);
    }

    #[test]
    fn test_stick_inside_dead_zone_does_nothing() {
        let mut registry = GamepadRegistry::new();
        registry.connect(0, "pad", true);
        let state = registry.state_mut(0).unwrap();
        state.set_axis(GamepadAxis::LeftX, 0.15);
        state.set_axis(GamepadAxis::RightX, -0.1);

        let mut source = GamepadSource::new(0, Vec2::ZERO);
        let intent = sample(&mut source, &registry);
        assert_eq!(intent.right, 0.0);
        assert_eq!(intent.left, 0.0);
        assert_eq!(intent.look, Vec2::ZERO);
    }

    #[test]
    fn test_right_stick_turns_and_pitch_clamps() {
        let mut registry = GamepadRegistry::new();
        registry.connect(0, "pad", true);
        let state = registry.state_mut(0).unwrap();
        state.set_axis(GamepadAxis::RightX, 1.0);
        state.set_axis(GamepadAxis::RightY, 1.0);

        let mut source = GamepadSource::new(0, Vec2::ZERO);
        let first = sample(&mut source, &registry);
        assert!((first.look.x + PI * LOOK_RATE).abs() < 1e-6);

        for _ in 0..500 {
            sample(&mut source, &registry);
        }
        let settled = sample(&mut source, &registry);
        assert!((settled.look.y + PI * PITCH_LIMIT).abs() < 1e-5);
    }
}
