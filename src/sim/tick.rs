//! Per-frame simulation update
//!
//! Advances every player by one tick of sampled intent. Pure: no rendering,
//! no platform, no clock reads.

use super::player::PlayerIntent;
use super::state::GameState;

/// Advance the simulation by one update tick
///
/// `intents[i]` drives player `i`; players without an intent keep their
/// facing and stand still.
pub fn tick(state: &mut GameState, intents: &[PlayerIntent], elapsed: f32) {
    for (i, player) in state.players.iter_mut().enumerate() {
        let intent = intents
            .get(i)
            .copied()
            .unwrap_or_else(|| PlayerIntent::idle(player.look()));
        player.update(&intent);
    }
    state.time_ticks += 1;
    state.elapsed = elapsed;
}
