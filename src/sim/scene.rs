//! Scene distance field
//!
//! The scene is a fixed procedural formula: one rounded box per visible
//! player plus a pit cut into the ground. Everything the formula reads lives
//! in a [`SceneSnapshot`] value, built once per viewport dispatch and never
//! mutated while pixels are being evaluated.

use glam::{Vec3, Vec4};

use super::player::Player;
use super::sdf;
use crate::consts::{MAX_PLAYERS, SCENE_DAMPING, SCENE_FAR};

/// Half extents of the enclosure box cut into the ground
pub const ENCLOSURE_HALF: Vec3 = Vec3::new(5.0, 0.5, 5.0);
/// Avatar half depth/height, and its minimum half width
const AVATAR_HALF: f32 = 0.5;
const AVATAR_MIN_WIDTH: f32 = 0.05;
const AVATAR_CORNER: f32 = 0.05;

/// One player slot as the scene sees it
///
/// The `w` components mark the slot: 1 = active, 0 = empty.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerSlot {
    pub pos: Vec4,
    pub dir: Vec4,
    pub vel: Vec4,
}

impl PlayerSlot {
    pub const EMPTY: Self = Self {
        pos: Vec4::ZERO,
        dir: Vec4::ZERO,
        vel: Vec4::ZERO,
    };

    pub fn from_player(player: &Player) -> Self {
        Self {
            pos: player.pos.extend(1.0),
            dir: player.dir.extend(1.0),
            vel: player.vel.extend(1.0),
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.pos.w == 1.0
    }
}

/// Immutable scene context for one dispatch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSnapshot {
    pub players: [PlayerSlot; MAX_PLAYERS],
    /// Slot whose camera is rendering; its own avatar is skipped
    pub camera_player: Option<usize>,
    /// Seconds since start, reserved for animated terms
    pub elapsed_time: f32,
}

impl Default for SceneSnapshot {
    fn default() -> Self {
        Self {
            players: [PlayerSlot::EMPTY; MAX_PLAYERS],
            camera_player: None,
            elapsed_time: 0.0,
        }
    }
}

impl SceneSnapshot {
    /// Pack the first `MAX_PLAYERS` players into slots; the rest stay empty
    pub fn from_players(players: &[Player], elapsed_time: f32) -> Self {
        let mut snapshot = Self {
            elapsed_time,
            ..Self::default()
        };
        for (slot, player) in snapshot.players.iter_mut().zip(players) {
            *slot = PlayerSlot::from_player(player);
        }
        snapshot
    }

    /// Same scene seen from another player's camera
    pub fn with_camera(mut self, camera_player: usize) -> Self {
        self.camera_player = Some(camera_player);
        self
    }

    /// Scene distance at `p`, damped by [`SCENE_DAMPING`]
    pub fn distance(&self, p: Vec3) -> f32 {
        self.avatars(p).min(enclosure(p)) * SCENE_DAMPING
    }

    /// Nearest avatar distance, excluding the camera owner
    pub fn avatars(&self, p: Vec3) -> f32 {
        self.players
            .iter()
            .enumerate()
            .filter(|(i, slot)| Some(*i) != self.camera_player && slot.is_active())
            .map(|(_, slot)| avatar(p, slot))
            .fold(SCENE_FAR, f32::min)
    }
}

/// Rounded box avatar in the player's horizontal frame
///
/// Looking down squashes the box along its local X axis.
pub fn avatar(p: Vec3, slot: &PlayerSlot) -> f32 {
    let dir = slot.dir.truncate();
    let facing = Vec3::new(dir.x, 0.0, dir.z) * 0.5;
    let squash = 0.5 - (-dir.y * 0.7).clamp(0.0, 0.5);
    let basis = sdf::look_at(facing.try_normalize().unwrap_or(Vec3::Z));
    // Orthonormal basis: the transpose is its inverse
    let local = basis.transpose() * (p - slot.pos.truncate());
    let half = Vec3::new(squash.max(AVATAR_MIN_WIDTH), AVATAR_HALF, AVATAR_HALF);
    sdf::round_box(local, half, AVATAR_CORNER)
}

/// Ground half-space (y < 0) with a box-shaped pit hollowed out of it
pub fn enclosure(p: Vec3) -> f32 {
    let pit = sdf::quick_box(p, ENCLOSURE_HALF);
    (-pit).max(-sdf::plane(p, Vec3::NEG_Y, 0.0))
}
