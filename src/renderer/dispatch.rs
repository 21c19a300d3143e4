//! Per-viewport dispatch orchestration
//!
//! [`plan_frame`] turns the game state into one immutable [`ViewSnapshot`]
//! per visible player. [`run_frame`] hands those to a [`RayDispatcher`] one
//! at a time; a dispatcher must finish (or fence) one view before the next
//! begins, so no two views ever share camera state.

use glam::{IVec2, UVec2};

use super::layout::{GridRule, Viewport, layout};
use crate::error::Result;
use crate::sim::{FrameGlobals, GameState, SceneSnapshot, ViewSnapshot};

/// One viewport and the snapshot its pixels are shaded from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewDispatch {
    pub viewport: Viewport,
    pub snapshot: ViewSnapshot,
}

/// Everything rendered in one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    /// Output image size (the window size)
    pub image_size: UVec2,
    pub globals: FrameGlobals,
    pub views: Vec<ViewDispatch>,
}

/// Time and pointer inputs of a frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTiming {
    pub elapsed_time: f32,
    pub delta_time: f32,
    /// Pointer position, top-left origin
    pub pointer: glam::Vec2,
}

/// Build the dispatch list for the current state
pub fn plan_frame(
    state: &GameState,
    window: UVec2,
    timing: FrameTiming,
    rule: GridRule,
) -> FramePlan {
    let layout = layout(window, state.player_count(), rule);
    let globals = FrameGlobals {
        render_size: layout.cell,
        elapsed_time: timing.elapsed_time,
        delta_time: timing.delta_time,
        mouse_coord: IVec2::new(
            timing.pointer.x as i32,
            window.y as i32 - timing.pointer.y as i32,
        ),
    };
    let scene = SceneSnapshot::from_players(&state.players, timing.elapsed_time);

    let views = layout
        .viewports
        .into_iter()
        .filter_map(|viewport| {
            let player = state.players.get(viewport.player)?;
            Some(ViewDispatch {
                viewport,
                snapshot: ViewSnapshot {
                    frame: globals,
                    scene: scene.with_camera(viewport.player),
                    camera_pos: player.eye(),
                    camera_dir: player.dir,
                    render_translation: viewport.translation,
                },
            })
        })
        .collect();

    FramePlan {
        image_size: window,
        globals,
        views,
    }
}

/// Backend that shades viewports into an output image
pub trait RayDispatcher {
    /// Prepare the output image and frame-wide data
    fn begin_frame(&mut self, plan: &FramePlan) -> Result<()>;

    /// Shade one viewport; the work must be complete or fenced before the
    /// next call observes different camera state
    fn dispatch(&mut self, view: &ViewDispatch) -> Result<()>;

    /// Wait for every dispatch and publish the image
    fn finish_frame(&mut self) -> Result<()>;
}

/// Drive a dispatcher through one frame
pub fn run_frame<D: RayDispatcher + ?Sized>(dispatcher: &mut D, plan: &FramePlan) -> Result<()> {
    dispatcher.begin_frame(plan)?;
    for view in &plan.views {
        log::trace!(
            "dispatch player {} at {:?} size {:?}",
            view.viewport.player,
            view.viewport.translation,
            view.viewport.size
        );
        dispatcher.dispatch(view)?;
    }
    dispatcher.finish_frame()
}
