//! Node identifiers and the recycling pool they come from.

use std::sync::atomic::{AtomicU32, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};

/// Stable handle to a node in a [`crate::SceneGraph`].
///
/// Ids are recycled when nodes are destroyed, so a stale handle may later
/// name a different node; holders are expected to drop handles for nodes
/// they destroy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Raw index, for logging.
    pub fn index(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Lock-free id allocator with recycling.
///
/// Freed ids sit in an unbounded channel acting as a free list; allocation
/// prefers a recycled id and falls back to bumping an atomic counter.
#[derive(Debug)]
pub struct IdPool {
    free_tx: Sender<u32>,
    free_rx: Receiver<u32>,
    next: AtomicU32,
}

impl IdPool {
    pub fn new() -> Self {
        let (free_tx, free_rx) = unbounded();
        Self {
            free_tx,
            free_rx,
            next: AtomicU32::new(0),
        }
    }

    /// Hand out an id, reusing a recycled one when available.
    ///
    /// # Panics
    ///
    /// Panics if the 32-bit id space is exhausted.
    pub fn allocate(&self) -> NodeId {
        if let Ok(recycled) = self.free_rx.try_recv() {
            return NodeId(recycled);
        }
        let fresh = self.next.fetch_add(1, Ordering::Relaxed);
        assert!(fresh < u32::MAX, "node id space exhausted");
        NodeId(fresh)
    }

    /// Return an id to the pool for reuse.
    pub fn release(&self, id: NodeId) {
        // Both channel ends live in the pool, so the send cannot fail.
        let _ = self.free_tx.send(id.0);
    }
}

impl Default for IdPool {
    fn default() -> Self {
        Self::new()
    }
}
