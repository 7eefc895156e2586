//! Scene graph: transform hierarchy, per-frame update, and the
//! frustum-culled traversal that queues render commands.
//!
//! Each frame runs two passes over the tree. `update` settles all geometry
//! first (transform composition, terrain split/collapse, aggregate bounds),
//! then `queue_render_commands` walks the settled tree with frustum
//! culling and lets visible nodes append to the render queues. Keeping the
//! passes separate means no node is ever culled against stale geometry.

mod error;
mod graph;
mod id_pool;
mod node;

pub use error::SceneError;
pub use graph::{FrameContext, SceneGraph};
pub use id_pool::{IdPool, NodeId};
pub use node::{NodeKind, Pass, PrimitiveNode, SceneNode};
