//! Split March - split-screen multiplayer SDF ray marching
//!
//! Core modules:
//! - `sim`: Deterministic scene, marcher and player simulation (no GPU, no platform)
//! - `input`: Keyboard/gamepad sources sampled into per-frame intents
//! - `renderer`: Viewport layout, dispatch orchestration, CPU and wgpu backends
//! - `platform`: winit window, event loop and gilrs gamepad registry
//! - `settings`: Data-driven configuration
//! - `watcher`: Shader file change notifications for hot reload
//! - `frame`: Frame clock and FPS counter

pub mod error;
pub mod frame;
pub mod input;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod watcher;

pub use error::{Error, Result};
pub use settings::Settings;

use glam::Vec3;

/// Demo configuration constants
pub mod consts {
    /// Number of player slots in the scene context (GPU array length)
    pub const MAX_PLAYERS: usize = 4;

    /// Ray marcher iteration cap
    pub const MARCH_MAX_STEPS: u32 = 200;
    /// Sampled distance below which the marcher reports a hit
    pub const MARCH_HIT_DISTANCE: f32 = 0.01;
    /// Accumulated distance above which the marcher gives up
    pub const MARCH_MAX_DISTANCE: f32 = 20.0;
    /// Iteration count mapped to a step fraction of 1.0 (can be exceeded)
    pub const MARCH_STEP_SCALE: f32 = 100.0;
    /// Finite difference offset for normal estimation
    pub const NORMAL_EPSILON: f32 = 0.001;

    /// Under-relaxation applied to the final scene distance
    pub const SCENE_DAMPING: f32 = 0.5;
    /// Occlusion accumulator start value (larger than any reachable distance)
    pub const SCENE_FAR: f32 = 100.0;

    /// Player movement per update tick
    pub const PLAYER_SPEED: f32 = 0.05;
    /// Camera height above the player origin
    pub const EYE_HEIGHT: f32 = 0.4;
    /// Distance between spawned players along Z
    pub const SPAWN_SPACING: f32 = 4.0;

    /// Compute workgroup edge (8x8 lanes)
    pub const WORKGROUP_SIZE: u32 = 8;
}

/// Unit facing vector from yaw/pitch in radians (yaw 0 looks down +Z)
#[inline]
pub fn spherical_to_cartesian(yaw: f32, pitch: f32) -> Vec3 {
    Vec3::new(yaw.sin() * pitch.cos(), pitch.sin(), yaw.cos() * pitch.cos()).normalize_or_zero()
}

/// Yaw/pitch of a facing vector, inverse of [`spherical_to_cartesian`]
#[inline]
pub fn cartesian_to_spherical(dir: Vec3) -> (f32, f32) {
    let dir = dir.normalize_or_zero();
    (dir.x.atan2(dir.z), dir.y.clamp(-1.0, 1.0).asin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_spherical_round_trip_axes() {
        let forward = spherical_to_cartesian(0.0, 0.0);
        assert!((forward - Vec3::Z).length() < 1e-6);

        let side = spherical_to_cartesian(FRAC_PI_2, 0.0);
        assert!((side - Vec3::X).length() < 1e-6);

        let (yaw, pitch) = cartesian_to_spherical(Vec3::NEG_Z);
        assert!((spherical_to_cartesian(yaw, pitch) - Vec3::NEG_Z).length() < 1e-5);
    }
}
