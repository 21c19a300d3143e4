//! GPU data structures (must match `shaders/march.wgsl`)

use bytemuck::{Pod, Zeroable};

use super::dispatch::ViewDispatch;
use crate::consts::MAX_PLAYERS;
use crate::sim::{FrameGlobals, PlayerSlot, SceneSnapshot};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameUniform {
    pub render_size: [i32; 2], // offset 0
    pub mouse_coord: [i32; 2], // offset 8
    pub elapsed_time: f32,     // offset 16
    pub delta_time: f32,       // offset 20
    pub _pad: [f32; 2],        // pad to 32 bytes
}

impl From<&FrameGlobals> for FrameUniform {
    fn from(globals: &FrameGlobals) -> Self {
        Self {
            render_size: globals.render_size.to_array(),
            mouse_coord: globals.mouse_coord.to_array(),
            elapsed_time: globals.elapsed_time,
            delta_time: globals.delta_time,
            _pad: [0.0; 2],
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PlayerUniform {
    pub pos: [f32; 4],
    pub dir: [f32; 4],
    pub vel: [f32; 4],
}

impl From<&PlayerSlot> for PlayerUniform {
    fn from(slot: &PlayerSlot) -> Self {
        Self {
            pos: slot.pos.to_array(),
            dir: slot.dir.to_array(),
            vel: slot.vel.to_array(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct PlayersUniform {
    pub slots: [PlayerUniform; MAX_PLAYERS],
}

impl From<&SceneSnapshot> for PlayersUniform {
    fn from(scene: &SceneSnapshot) -> Self {
        Self {
            slots: scene.players.each_ref().map(PlayerUniform::from),
        }
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ViewUniform {
    pub camera_pos: [f32; 4],         // offset 0
    pub camera_dir: [f32; 4],         // offset 16
    pub render_translation: [i32; 2], // offset 32
    pub clip_size: [i32; 2],          // offset 40
    pub camera_player: i32,           // offset 48, -1 = none
    pub _pad: [i32; 3],               // pad to 64 bytes
}

impl From<&ViewDispatch> for ViewUniform {
    fn from(view: &ViewDispatch) -> Self {
        let snapshot = &view.snapshot;
        Self {
            camera_pos: snapshot.camera_pos.extend(1.0).to_array(),
            camera_dir: snapshot.camera_dir.extend(0.0).to_array(),
            render_translation: snapshot.render_translation.to_array(),
            clip_size: view.viewport.size.to_array(),
            camera_player: snapshot
                .scene
                .camera_player
                .map_or(-1, |player| player as i32),
            _pad: [0; 3],
        }
    }
}
