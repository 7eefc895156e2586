//! The engine context: every piece of per-frame state, owned in one place.
//!
//! There is deliberately no global instance. Whoever drives a frame owns an
//! `EngineContext` and passes it (or its parts) down explicitly, which keeps
//! tests able to run several engines side by side and makes the data flow
//! of a frame readable at the call site.

use glam::DVec3;
use tracing::debug;

use tellus_coords::CameraFrame;
use tellus_math::Frustum;
use tellus_render::{GraphicsContext, RenderQueues};
use tellus_scene::{FrameContext, SceneGraph};

/// Owner of the camera, the scene, and the per-frame render queues.
pub struct EngineContext {
    pub camera: CameraFrame,
    pub scene: SceneGraph,
    pub queues: RenderQueues,
    frame_index: u64,
}

impl EngineContext {
    /// Create a context with an empty scene and the camera at the given
    /// world position.
    pub fn new(camera_position: DVec3) -> Self {
        Self {
            camera: CameraFrame::new(camera_position),
            scene: SceneGraph::new(),
            queues: RenderQueues::new(),
            frame_index: 0,
        }
    }

    /// Number of frames rendered so far.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// One fixed simulation step: settle the scene against the current
    /// camera (terrain split/collapse, transforms, aggregate bounds).
    pub fn simulate(&mut self, dt: f64) {
        self.scene.update(dt, &self.camera);
    }

    /// Render one frame against the given frustum.
    ///
    /// Refreshes the camera's derived f32 values and installs the high/low
    /// pair on the graphics context, clears and refills the queues from the
    /// scene traversal, then drains them into the graphics context. The
    /// queues are empty when this returns.
    pub fn render_frame(&mut self, frustum: Frustum, gfx: &mut dyn GraphicsContext) {
        self.camera.refresh();
        gfx.set_camera(self.camera.high_low());
        self.queues.begin_frame();

        let frame = FrameContext {
            index: self.frame_index,
            frustum,
            camera: self.camera.clone(),
        };
        self.scene
            .queue_render_commands(&frame, &mut self.queues, gfx);

        debug!(
            frame = self.frame_index,
            deferred = self.queues.deferred_len(),
            normal = self.queues.normal_len(),
            "frame gathered"
        );
        self.queues.drain(gfx);
        self.frame_index += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DMat4;
    use tellus_render::{BufferId, MaterialId, RecordedCall, RecordingContext};
    use tellus_scene::NodeKind;
    use tellus_terrain::{TerrainParams, TerrainSurface};

    const RADIUS: f64 = 6_371_000.0;

    fn planet_context(altitude: f64) -> EngineContext {
        let eye = DVec3::new(0.0, -(RADIUS + altitude), 0.0);
        let mut ctx = EngineContext::new(eye);
        ctx.scene.create_node(
            "planet",
            NodeKind::Terrain(TerrainSurface::hemispheres(
                TerrainParams::new(RADIUS, 1.2, 10),
                BufferId(0),
                MaterialId(0),
            )),
        );
        ctx
    }

    fn frustum_toward_origin(eye: DVec3) -> Frustum {
        let view = DMat4::look_at_rh(eye, DVec3::ZERO, DVec3::Z);
        let proj = DMat4::perspective_rh(1.2, 1.0, 1.0, 100.0 * RADIUS);
        Frustum::from_view_projection(&(proj * view))
    }

    #[test]
    fn test_full_frame_pipeline_submits_terrain() {
        let mut ctx = planet_context(0.15 * RADIUS);
        let mut gfx = RecordingContext::new();

        ctx.simulate(1.0 / 60.0);
        ctx.render_frame(frustum_toward_origin(ctx.camera.position()), &mut gfx);

        assert!(gfx.submit_count() > 0, "terrain must reach the device");
        assert!(ctx.queues.is_empty(), "queues drain by end of frame");
        assert_eq!(ctx.frame_index(), 1);
    }

    #[test]
    fn test_consecutive_frames_do_not_accumulate() {
        let mut ctx = planet_context(0.15 * RADIUS);
        let frustum = frustum_toward_origin(ctx.camera.position());

        let mut first = 0;
        for i in 0..3 {
            let mut gfx = RecordingContext::new();
            ctx.simulate(1.0 / 60.0);
            ctx.render_frame(frustum.clone(), &mut gfx);
            if i == 0 {
                first = gfx.submit_count();
            } else {
                assert_eq!(
                    gfx.submit_count(),
                    first,
                    "static camera must submit the same commands each frame"
                );
            }
        }
        assert_eq!(ctx.frame_index(), 3);
    }

    #[test]
    fn test_render_frame_installs_camera_before_any_submission() {
        let mut ctx = planet_context(0.15 * RADIUS);
        let mut gfx = RecordingContext::new();

        ctx.simulate(1.0 / 60.0);
        ctx.render_frame(frustum_toward_origin(ctx.camera.position()), &mut gfx);

        let pair = gfx.camera().expect("render_frame must install the camera");
        assert!(
            (pair.reconstruct() - ctx.camera.position()).length() < 1.0,
            "installed pair must reconstruct the camera position"
        );
        assert!(
            matches!(gfx.calls()[0], RecordedCall::SetCamera(_)),
            "camera goes to the device before anything else"
        );
    }

    #[test]
    fn test_camera_refresh_happens_inside_render_frame() {
        let mut ctx = planet_context(0.15 * RADIUS);
        let mut gfx = RecordingContext::new();

        let moved = DVec3::new(0.0, -(RADIUS + 0.05 * RADIUS), 0.0);
        ctx.camera.set_position(moved);
        ctx.render_frame(frustum_toward_origin(moved), &mut gfx);

        let reconstructed = ctx.camera.high_low().reconstruct();
        assert!(
            (reconstructed - moved).length() < 1.0,
            "high/low pair must reflect the moved camera"
        );
    }
}
