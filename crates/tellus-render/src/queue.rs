//! Per-frame render-command queues and the two-pass drain.

use tracing::trace;

use crate::command::RenderCommand;
use crate::context::{GraphicsContext, RenderTarget};

/// Lifecycle of the queues within one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum QueuePhase {
    /// Commands may be enqueued.
    Gathering,
    /// The frame's drain has run; enqueuing is a bug until the next
    /// `begin_frame`.
    Drained,
}

/// The two per-frame FIFO command queues.
///
/// `begin_frame` clears both queues before traversal; traversal appends via
/// the `enqueue_*` methods; [`drain`](Self::drain) submits the deferred
/// queue to the intermediate target, switches to the main target, then
/// submits the normal queue. Everything is single-threaded: no command may
/// be enqueued once the frame's drain has started.
#[derive(Debug)]
pub struct RenderQueues {
    deferred: Vec<RenderCommand>,
    normal: Vec<RenderCommand>,
    phase: QueuePhase,
}

impl RenderQueues {
    /// Create empty queues, ready for a first frame.
    pub fn new() -> Self {
        Self {
            deferred: Vec::new(),
            normal: Vec::new(),
            phase: QueuePhase::Gathering,
        }
    }

    /// Clear both queues and re-arm gathering. Call at the start of every
    /// frame, before traversal.
    pub fn begin_frame(&mut self) {
        self.deferred.clear();
        self.normal.clear();
        self.phase = QueuePhase::Gathering;
    }

    /// Append to the deferred (intermediate-target) queue.
    ///
    /// # Panics
    ///
    /// Panics if called after this frame's drain has started.
    pub fn enqueue_deferred(&mut self, command: RenderCommand) {
        assert_eq!(
            self.phase,
            QueuePhase::Gathering,
            "enqueue after drain started"
        );
        self.deferred.push(command);
    }

    /// Append to the normal (main-target) queue.
    ///
    /// # Panics
    ///
    /// Panics if called after this frame's drain has started.
    pub fn enqueue_normal(&mut self, command: RenderCommand) {
        assert_eq!(
            self.phase,
            QueuePhase::Gathering,
            "enqueue after drain started"
        );
        self.normal.push(command);
    }

    /// Number of commands waiting in the deferred queue.
    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    /// Number of commands waiting in the normal queue.
    pub fn normal_len(&self) -> usize {
        self.normal.len()
    }

    /// True if both queues are empty.
    pub fn is_empty(&self) -> bool {
        self.deferred.is_empty() && self.normal.is_empty()
    }

    /// Execute the two-pass drain in FIFO order.
    ///
    /// The deferred queue is fully submitted against the intermediate
    /// target, then the context switches to the main target and the normal
    /// queue is fully submitted. Both queues are empty afterwards.
    pub fn drain(&mut self, gfx: &mut dyn GraphicsContext) {
        self.phase = QueuePhase::Drained;
        trace!(
            deferred = self.deferred.len(),
            normal = self.normal.len(),
            "draining render queues"
        );

        gfx.set_target(RenderTarget::Intermediate);
        for command in self.deferred.drain(..) {
            gfx.submit(&command);
        }

        gfx.set_target(RenderTarget::Main);
        for command in self.normal.drain(..) {
            gfx.submit(&command);
        }
    }
}

impl Default for RenderQueues {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{BufferId, GeometryRef, MaterialId, PrimitiveTopology, StateOverrides};
    use crate::context::{RecordedCall, RecordingContext};
    use glam::Mat4;

    fn command(buffer: u32) -> RenderCommand {
        RenderCommand {
            geometry: GeometryRef {
                buffer: BufferId(buffer),
                vertices: 0..4,
            },
            topology: PrimitiveTopology::TriangleStrip,
            material: MaterialId(0),
            transform: Mat4::IDENTITY,
            state: StateOverrides::default(),
        }
    }

    #[test]
    fn test_queues_start_empty() {
        let queues = RenderQueues::new();
        assert!(queues.is_empty());
        assert_eq!(queues.deferred_len(), 0);
        assert_eq!(queues.normal_len(), 0);
    }

    #[test]
    fn test_begin_frame_clears_both_queues() {
        let mut queues = RenderQueues::new();
        queues.enqueue_deferred(command(0));
        queues.enqueue_normal(command(1));
        queues.begin_frame();
        assert!(queues.is_empty());
    }

    #[test]
    fn test_drain_is_two_pass_fifo() {
        let mut queues = RenderQueues::new();
        let mut gfx = RecordingContext::new();
        queues.begin_frame();
        queues.enqueue_deferred(command(10));
        queues.enqueue_deferred(command(11));
        queues.enqueue_normal(command(20));
        queues.drain(&mut gfx);

        let calls = gfx.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[0], RecordedCall::SetTarget(RenderTarget::Intermediate));
        assert!(matches!(&calls[1], RecordedCall::Submit(c) if c.geometry.buffer == BufferId(10)));
        assert!(matches!(&calls[2], RecordedCall::Submit(c) if c.geometry.buffer == BufferId(11)));
        assert_eq!(calls[3], RecordedCall::SetTarget(RenderTarget::Main));
        assert!(matches!(&calls[4], RecordedCall::Submit(c) if c.geometry.buffer == BufferId(20)));
    }

    #[test]
    fn test_queues_empty_after_drain() {
        let mut queues = RenderQueues::new();
        let mut gfx = RecordingContext::new();
        queues.begin_frame();
        queues.enqueue_normal(command(0));
        queues.drain(&mut gfx);
        assert!(queues.is_empty());
    }

    #[test]
    #[should_panic(expected = "enqueue after drain started")]
    fn test_enqueue_after_drain_panics() {
        let mut queues = RenderQueues::new();
        let mut gfx = RecordingContext::new();
        queues.begin_frame();
        queues.drain(&mut gfx);
        queues.enqueue_normal(command(0));
    }

    #[test]
    fn test_next_begin_frame_rearms_gathering() {
        let mut queues = RenderQueues::new();
        let mut gfx = RecordingContext::new();
        queues.begin_frame();
        queues.drain(&mut gfx);
        queues.begin_frame();
        queues.enqueue_deferred(command(0)); // must not panic
        assert_eq!(queues.deferred_len(), 1);
    }
}
