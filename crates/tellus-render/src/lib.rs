//! Render commands, per-frame queues, and the graphics-context contract.
//!
//! Scene traversal decides *what* should be drawn and records it as
//! immutable [`RenderCommand`]s in two per-frame queues; the renderer later
//! decides *how*, draining the deferred queue against an intermediate
//! target and the normal queue against the main target. The graphics device
//! itself sits behind the narrow [`GraphicsContext`] trait.

mod command;
mod context;
mod queue;
mod vertex;

pub use command::{
    BlendMode, BufferId, GeometryRef, MaterialId, PrimitiveTopology, RenderCommand,
    StateOverrides,
};
pub use context::{GraphicsContext, RecordingContext, RecordedCall, RenderTarget};
pub use queue::RenderQueues;
pub use vertex::SurfaceVertex;
