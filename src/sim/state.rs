//! Simulation state
//!
//! Everything the frame loop mutates between dispatches lives here. The
//! renderer only ever sees immutable snapshots of it.

use serde::{Deserialize, Serialize};

use super::player::Player;
use crate::consts::MAX_PLAYERS;

/// All players plus the simulation clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Active players, index = player slot
    pub players: Vec<Player>,
    /// Update ticks applied so far
    pub time_ticks: u64,
    /// Seconds since start (drives animated scene terms)
    pub elapsed: f32,
}

impl GameState {
    /// Spawn `player_count` players (clamped to 1..=MAX_PLAYERS)
    pub fn new(player_count: usize) -> Self {
        let count = player_count.clamp(1, MAX_PLAYERS);
        if count != player_count {
            log::warn!("player count {player_count} clamped to {count}");
        }
        Self {
            players: (0..count).map(Player::spawn).collect(),
            time_ticks: 0,
            elapsed: 0.0,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_player_count() {
        assert_eq!(GameState::new(0).player_count(), 1);
        assert_eq!(GameState::new(3).player_count(), 3);
        assert_eq!(GameState::new(9).player_count(), MAX_PLAYERS);
    }

    #[test]
    fn test_state_serializes() {
        let state = GameState::new(2);
        let json = serde_json::to_string(&state).expect("serialize");
        let back: GameState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.players, state.players);
    }
}
