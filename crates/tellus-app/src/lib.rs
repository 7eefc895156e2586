//! Application shell: engine context, fixed-timestep frame loop, and the
//! per-frame pipeline tying camera, scene, and render queues together.

mod context;
mod frame_loop;

pub use context::EngineContext;
pub use frame_loop::{FrameLoop, MAX_FRAME_TIME};
