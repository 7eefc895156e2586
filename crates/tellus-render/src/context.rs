//! The graphics-device contract consumed by the queue drain and terrain upload.

use tellus_coords::HighLow;

use crate::command::{BufferId, RenderCommand};
use crate::vertex::SurfaceVertex;

/// Which target subsequent submissions render into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderTarget {
    /// Intermediate target the deferred pass renders into.
    Intermediate,
    /// The main (final) target.
    Main,
}

/// Narrow interface to the graphics device.
///
/// The core only ever needs three things from the device: select a target,
/// (re)fill a vertex buffer, and submit one batch of state + geometry. How
/// these are implemented (wgpu, GL, a test recorder) is not this crate's
/// concern.
pub trait GraphicsContext {
    /// Install this frame's camera position as a high/low float pair.
    ///
    /// Called once per frame before any submission; the vertex stage
    /// subtracts the pair from world positions to reconstruct precise
    /// camera-relative coordinates at planetary magnitudes.
    fn set_camera(&mut self, camera: HighLow);

    /// Direct subsequent submissions to the given target.
    fn set_target(&mut self, target: RenderTarget);

    /// Replace the contents of a context-owned vertex buffer.
    fn upload_vertices(&mut self, buffer: BufferId, vertices: &[SurfaceVertex]);

    /// Execute one draw command against the current target.
    fn submit(&mut self, command: &RenderCommand);
}

/// One call observed by the [`RecordingContext`].
#[derive(Clone, Debug, PartialEq)]
pub enum RecordedCall {
    SetCamera(HighLow),
    SetTarget(RenderTarget),
    Upload { buffer: BufferId, vertex_count: usize },
    Submit(RenderCommand),
}

/// A [`GraphicsContext`] that records every call instead of drawing.
///
/// Used by the headless demo and by tests that assert on submission order
/// and batch contents.
#[derive(Debug, Default)]
pub struct RecordingContext {
    calls: Vec<RecordedCall>,
    uploads: Vec<(BufferId, Vec<SurfaceVertex>)>,
    camera: Option<HighLow>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// The last vertex data uploaded to the given buffer, if any.
    pub fn last_upload(&self, buffer: BufferId) -> Option<&[SurfaceVertex]> {
        self.uploads
            .iter()
            .rev()
            .find(|(id, _)| *id == buffer)
            .map(|(_, data)| data.as_slice())
    }

    /// Commands submitted so far, in order.
    pub fn submitted(&self) -> impl Iterator<Item = &RenderCommand> {
        self.calls.iter().filter_map(|call| match call {
            RecordedCall::Submit(command) => Some(command),
            _ => None,
        })
    }

    /// Number of submitted commands.
    pub fn submit_count(&self) -> usize {
        self.submitted().count()
    }

    /// The camera pair most recently installed, if any.
    pub fn camera(&self) -> Option<HighLow> {
        self.camera
    }

    /// Forget everything recorded so far.
    pub fn clear(&mut self) {
        self.calls.clear();
        self.uploads.clear();
        self.camera = None;
    }
}

impl GraphicsContext for RecordingContext {
    fn set_camera(&mut self, camera: HighLow) {
        self.calls.push(RecordedCall::SetCamera(camera));
        self.camera = Some(camera);
    }

    fn set_target(&mut self, target: RenderTarget) {
        self.calls.push(RecordedCall::SetTarget(target));
    }

    fn upload_vertices(&mut self, buffer: BufferId, vertices: &[SurfaceVertex]) {
        self.calls.push(RecordedCall::Upload {
            buffer,
            vertex_count: vertices.len(),
        });
        self.uploads.push((buffer, vertices.to_vec()));
    }

    fn submit(&mut self, command: &RenderCommand) {
        self.calls.push(RecordedCall::Submit(command.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_context_preserves_order() {
        let mut gfx = RecordingContext::new();
        gfx.set_target(RenderTarget::Intermediate);
        gfx.upload_vertices(BufferId(3), &[SurfaceVertex::new(0.0, 0.0, 0.0, 0.0)]);
        gfx.set_target(RenderTarget::Main);

        assert_eq!(gfx.calls().len(), 3);
        assert_eq!(gfx.calls()[0], RecordedCall::SetTarget(RenderTarget::Intermediate));
        assert!(matches!(
            gfx.calls()[1],
            RecordedCall::Upload { buffer: BufferId(3), vertex_count: 1 }
        ));
    }

    #[test]
    fn test_set_camera_is_recorded_and_readable() {
        let mut gfx = RecordingContext::new();
        assert_eq!(gfx.camera(), None);

        let pair = HighLow::split(glam::DVec3::new(6_371_000.25, -42.0, 0.5));
        gfx.set_camera(pair);
        assert_eq!(gfx.camera(), Some(pair));
        assert_eq!(gfx.calls()[0], RecordedCall::SetCamera(pair));

        gfx.clear();
        assert_eq!(gfx.camera(), None);
    }

    #[test]
    fn test_last_upload_returns_most_recent() {
        let mut gfx = RecordingContext::new();
        gfx.upload_vertices(BufferId(1), &[SurfaceVertex::new(0.0, 0.0, 0.0, 0.0)]);
        gfx.upload_vertices(
            BufferId(1),
            &[
                SurfaceVertex::new(1.0, 1.0, 1.0, 1.0),
                SurfaceVertex::new(2.0, 2.0, 0.0, 1.0),
            ],
        );
        let last = gfx.last_upload(BufferId(1)).unwrap();
        assert_eq!(last.len(), 2);
        assert_eq!(gfx.last_upload(BufferId(9)), None);
    }
}
