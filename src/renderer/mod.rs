//! Rendering
//!
//! Layout and dispatch planning are backend independent. Two dispatchers
//! shade the planned viewports: [`GpuRenderer`] with a wgpu compute shader
//! and [`CpuDispatcher`] with rayon (headless, used by tests).

pub mod cpu;
pub mod dispatch;
pub mod gpu;
pub mod gpu_types;
pub mod layout;
pub mod shader;

pub use cpu::{CpuDispatcher, FrameImage};
pub use dispatch::{FramePlan, FrameTiming, RayDispatcher, ViewDispatch, plan_frame, run_frame};
pub use gpu::GpuRenderer;
pub use layout::{GridRule, Layout, Viewport, layout};
