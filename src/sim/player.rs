//! Player avatar pose and per-tick movement
//!
//! Movement is a flat velocity add: no collision, no gravity.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::{EYE_HEIGHT, PLAYER_SPEED, SPAWN_SPACING};
use crate::{cartesian_to_spherical, spherical_to_cartesian};

/// One frame of player intent, sampled from an input source
///
/// Directional intents are in `[0, 1]`; `look` is (yaw, pitch) in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerIntent {
    pub left: f32,
    pub right: f32,
    pub forward: f32,
    pub backward: f32,
    pub jump: f32,
    pub fire: f32,
    pub look: Vec2,
}

impl PlayerIntent {
    /// No movement, looking along `look`
    pub fn idle(look: Vec2) -> Self {
        Self {
            look,
            ..Self::default()
        }
    }

    /// Movement relative to the look direction: x = right, z = backward
    pub fn local_move_dir(&self) -> Vec3 {
        Vec3::new(
            self.right - self.left,
            0.0,
            self.backward - self.forward,
        )
    }

    pub fn front(&self) -> Vec3 {
        spherical_to_cartesian(self.look.x, self.look.y)
    }

    pub fn right_dir(&self) -> Vec3 {
        self.front().cross(Vec3::Y).normalize_or_zero()
    }

    pub fn up(&self) -> Vec3 {
        self.right_dir().cross(self.front()).normalize_or_zero()
    }

    /// Look direction flattened onto the ground plane
    pub fn move_front(&self) -> Vec3 {
        flatten(self.front())
    }

    pub fn move_right(&self) -> Vec3 {
        flatten(self.right_dir())
    }

    pub fn move_up(&self) -> Vec3 {
        Vec3::Y
    }
}

#[inline]
fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z).normalize_or_zero()
}

/// A player avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec3,
    /// Unit facing vector
    pub dir: Vec3,
    /// Displacement applied on the last tick
    pub vel: Vec3,
}

impl Player {
    pub fn new(pos: Vec3, dir: Vec3) -> Self {
        Self {
            pos,
            dir: dir.normalize_or_zero(),
            vel: Vec3::ZERO,
        }
    }

    /// Spawn slot `index`: players line up along Z, neighbours facing each other
    pub fn spawn(index: usize) -> Self {
        let offset = index as f32 - 0.5;
        Self::new(
            Vec3::new(0.0, 0.0, offset * SPAWN_SPACING),
            Vec3::new(0.0, 0.0, -offset.signum()),
        )
    }

    /// Current facing as (yaw, pitch)
    pub fn look(&self) -> Vec2 {
        let (yaw, pitch) = cartesian_to_spherical(self.dir);
        Vec2::new(yaw, pitch)
    }

    pub fn eye(&self) -> Vec3 {
        self.pos + Vec3::new(0.0, EYE_HEIGHT, 0.0)
    }

    /// Apply one tick of intent
    pub fn update(&mut self, intent: &PlayerIntent) {
        self.dir = intent.front();

        let local = intent.local_move_dir();
        self.vel = (local.x * intent.move_right() + local.y * intent.move_up()
            - local.z * intent.move_front())
            * PLAYER_SPEED;
        self.pos += self.vel;

        if intent.fire > 0.0 {
            self.fire();
        }
    }

    /// Reserved for shooting; intentionally has no gameplay effect yet
    fn fire(&mut self) {
        log::trace!("fire requested at {:?}", self.pos);
    }
}
