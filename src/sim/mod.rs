//! Deterministic simulation module
//!
//! Scene evaluation, ray marching and player movement. This module must stay
//! pure:
//! - No GPU or platform dependencies
//! - No clock reads (time is passed in)
//! - Snapshots are values, never shared mutable state

pub mod march;
pub mod player;
pub mod scene;
pub mod sdf;
pub mod state;
pub mod tick;
pub mod view;

pub use march::{MarchResult, march, normal};
pub use player::{Player, PlayerIntent};
pub use scene::{PlayerSlot, SceneSnapshot};
pub use state::GameState;
pub use tick::tick;
pub use view::{FrameGlobals, ViewSnapshot};
