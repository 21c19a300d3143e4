//! Gamepad hot-plug and state tracking over gilrs

use gilrs::{Axis, Button, EventType, Gilrs, MappingSource};

use crate::input::{GamepadAxis, GamepadButton, GamepadRegistry};

/// Owns the gilrs context and is the only writer of the registry
pub struct GamepadHub {
    gilrs: Option<Gilrs>,
    registry: GamepadRegistry,
}

impl GamepadHub {
    /// Open the gamepad backend and report devices that are already plugged in
    ///
    /// Without a working backend every gamepad slot reads as disconnected.
    pub fn new() -> Self {
        let gilrs = match Gilrs::new() {
            Ok(gilrs) => Some(gilrs),
            Err(gilrs::Error::NotImplemented(dummy)) => {
                log::warn!("Gamepads are not supported on this platform");
                Some(dummy)
            }
            Err(e) => {
                log::error!("Failed to initialize gamepad support: {e}");
                None
            }
        };

        let mut hub = Self {
            gilrs,
            registry: GamepadRegistry::new(),
        };
        let present: Vec<(usize, String, bool)> = hub
            .gilrs
            .iter()
            .flat_map(|gilrs| gilrs.gamepads())
            .map(|(id, pad)| {
                (usize::from(id), pad.name().to_string(), is_gamepad(pad.mapping_source()))
            })
            .collect();
        for (id, name, gamepad) in present {
            hub.connect(id, name, gamepad);
        }
        hub
    }

    pub fn registry(&self) -> &GamepadRegistry {
        &self.registry
    }

    /// Drain pending gilrs events into the registry
    pub fn pump(&mut self) {
        let Some(gilrs) = self.gilrs.as_mut() else {
            return;
        };

        let mut connected = Vec::new();
        while let Some(event) = gilrs.next_event() {
            let id = usize::from(event.id);
            match event.event {
                EventType::Connected => {
                    let pad = gilrs.gamepad(event.id);
                    connected.push((id, pad.name().to_string(), is_gamepad(pad.mapping_source())));
                }
                EventType::Disconnected => {
                    if let Some(info) = self.registry.disconnect(id) {
                        print_status(false, &info.name, info.is_gamepad);
                    }
                }
                EventType::ButtonPressed(button, _) | EventType::ButtonReleased(button, _) => {
                    let pressed = matches!(event.event, EventType::ButtonPressed(..));
                    if let (Some(button), Some(state)) =
                        (map_button(button), self.registry.state_mut(id))
                    {
                        state.set_button(button, pressed);
                    }
                }
                EventType::AxisChanged(axis, value, _) => {
                    if let (Some((axis, sign)), Some(state)) =
                        (map_axis(axis), self.registry.state_mut(id))
                    {
                        state.set_axis(axis, sign * value);
                    }
                }
                _ => {}
            }
        }

        for (id, name, gamepad) in connected {
            self.connect(id, name, gamepad);
        }
    }

    fn connect(&mut self, id: usize, name: String, gamepad: bool) {
        print_status(true, &name, gamepad);
        self.registry.connect(id, name, gamepad);
    }
}

impl Default for GamepadHub {
    fn default() -> Self {
        Self::new()
    }
}

fn is_gamepad(source: MappingSource) -> bool {
    source != MappingSource::None
}

/// Lines printed when a device comes or goes
pub fn status_lines(connected: bool, name: &str, is_gamepad: bool) -> Vec<String> {
    let mut lines = vec![
        if connected {
            "joystick connected".to_string()
        } else {
            "joystick disconnected".to_string()
        },
        format!("with name: {name}"),
    ];
    if is_gamepad {
        lines.push(format!("is a gamepad with name: {name}"));
    }
    lines
}

fn print_status(connected: bool, name: &str, is_gamepad: bool) {
    for line in status_lines(connected, name, is_gamepad) {
        println!("{line}");
    }
}

fn map_button(button: Button) -> Option<GamepadButton> {
    match button {
        Button::DPadUp => Some(GamepadButton::DPadUp),
        Button::DPadDown => Some(GamepadButton::DPadDown),
        Button::DPadLeft => Some(GamepadButton::DPadLeft),
        Button::DPadRight => Some(GamepadButton::DPadRight),
        Button::South => Some(GamepadButton::South),
        Button::RightTrigger => Some(GamepadButton::RightBumper),
        _ => None,
    }
}

/// gilrs reports stick Y as up-positive; the registry stores down-positive
fn map_axis(axis: Axis) -> Option<(GamepadAxis, f32)> {
    match axis {
        Axis::LeftStickX => Some((GamepadAxis::LeftX, 1.0)),
        Axis::LeftStickY => Some((GamepadAxis::LeftY, -1.0)),
        Axis::RightStickX => Some((GamepadAxis::RightX, 1.0)),
        Axis::RightStickY => Some((GamepadAxis::RightY, -1.0)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_lines() {
        assert_eq!(
            status_lines(true, "Pad", true),
            ["joystick connected", "with name: Pad", "is a gamepad with name: Pad"]
        );
        assert_eq!(
            status_lines(false, "Stick", false),
            ["joystick disconnected", "with name: Stick"]
        );
    }

    #[test]
    fn test_mappings() {
        assert_eq!(map_button(Button::RightTrigger), Some(GamepadButton::RightBumper));
        assert_eq!(map_button(Button::RightTrigger2), None);
        assert_eq!(map_axis(Axis::LeftStickY), Some((GamepadAxis::LeftY, -1.0)));
        assert_eq!(map_axis(Axis::LeftZ), None);
        assert!(!is_gamepad(MappingSource::None));
        assert!(is_gamepad(MappingSource::SdlMappings));
    }
}
