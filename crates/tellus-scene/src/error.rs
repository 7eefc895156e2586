use thiserror::Error;

use crate::id_pool::NodeId;

/// Errors from structural scene-graph operations.
///
/// Every fallible operation validates before mutating, so a returned error
/// always leaves the graph exactly as it was.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("{0} does not exist in this scene")]
    NodeNotFound(NodeId),

    #[error("attaching {node} under {new_parent} would create a cycle")]
    WouldCycle { node: NodeId, new_parent: NodeId },
}
