//! Input sources
//!
//! Each player slot is bound to one source. Sources are sampled once per
//! frame into a [`PlayerIntent`], which is all the simulation sees.

pub mod curve;
pub mod gamepad;
pub mod keyboard;

pub use gamepad::{GamepadAxis, GamepadButton, GamepadRegistry, GamepadSource, GamepadState};
pub use keyboard::KeyboardSource;

use crate::platform::keyboard::KeyboardState;
use crate::sim::{Player, PlayerIntent};

/// Device state visible to sources for one frame
#[derive(Debug, Clone, Copy)]
pub struct InputDevices<'a> {
    pub keyboard: &'a KeyboardState,
    pub gamepads: &'a GamepadRegistry,
}

/// Something that turns device state into a player's intent
pub trait InputSource {
    fn sample(&mut self, devices: &InputDevices<'_>) -> PlayerIntent;
}

/// Source bound to one player slot
#[derive(Debug, Clone, PartialEq)]
pub enum InputBinding {
    Keyboard(KeyboardSource),
    Gamepad(GamepadSource),
}

impl InputBinding {
    /// Bind `keyboard_player` to keyboard+mouse and the rest to gamepads in order
    pub fn assign(players: &[Player], keyboard_player: usize) -> Vec<Self> {
        let mut next_gamepad = 0;
        players
            .iter()
            .enumerate()
            .map(|(slot, player)| {
                if slot == keyboard_player {
                    Self::Keyboard(KeyboardSource::new(player.look()))
                } else {
                    let source = GamepadSource::new(next_gamepad, player.look());
                    next_gamepad += 1;
                    Self::Gamepad(source)
                }
            })
            .collect()
    }
}

impl InputSource for InputBinding {
    fn sample(&mut self, devices: &InputDevices<'_>) -> PlayerIntent {
        match self {
            Self::Keyboard(source) => source.sample(devices),
            Self::Gamepad(source) => source.sample(devices),
        }
    }
}

/// Sample every binding in slot order
pub fn sample_all(bindings: &mut [InputBinding], devices: &InputDevices<'_>) -> Vec<PlayerIntent> {
    bindings
        .iter_mut()
        .map(|binding| binding.sample(devices))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_counts_gamepads_past_keyboard_slot() {
        let players: Vec<Player> = (0..4).map(Player::spawn).collect();
        let bindings = InputBinding::assign(&players, 1);
        assert!(matches!(&bindings[0], InputBinding::Gamepad(s) if s.index == 0));
        assert!(matches!(&bindings[1], InputBinding::Keyboard(_)));
        assert!(matches!(&bindings[2], InputBinding::Gamepad(s) if s.index == 1));
        assert!(matches!(&bindings[3], InputBinding::Gamepad(s) if s.index == 2));
    }

    #[test]
    fn test_keyboard_slot_out_of_range_means_all_gamepads() {
        let players: Vec<Player> = (0..2).map(Player::spawn).collect();
        let bindings = InputBinding::assign(&players, 7);
        assert!(bindings.iter().all(|b| matches!(b, InputBinding::Gamepad(_))));
    }

    #[test]
    fn test_sample_all_without_devices_is_idle() {
        let players: Vec<Player> = (0..2).map(Player::spawn).collect();
        let mut bindings = InputBinding::assign(&players, 1);
        let keyboard = KeyboardState::default();
        let gamepads = GamepadRegistry::new();
        let intents = sample_all(
            &mut bindings,
            &InputDevices {
                keyboard: &keyboard,
                gamepads: &gamepads,
            },
        );
        assert_eq!(intents.len(), 2);
        assert!(intents.iter().all(|i| i.forward == 0.0 && i.fire == 0.0));
    }
}
