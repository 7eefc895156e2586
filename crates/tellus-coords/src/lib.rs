//! Camera-relative double-precision coordinate frame.
//!
//! Simulation-side positions are f64 throughout: at planetary magnitudes
//! (~6.4e6 m) an f32 carries less than one meter of precision, which is
//! unusable at pedestrian scale. This crate keeps the authoritative camera
//! position in f64 and narrows to f32 only at the render boundary, in two
//! forms:
//!
//! - a camera-relative subtraction (`relative_to_camera`), performed in f64
//!   before narrowing so nearby world positions become small, precise f32
//!   values;
//! - a high/low float pair (`HighLow`) decomposing the f64 camera position
//!   so GPU-side arithmetic can reconstruct camera-relative positions
//!   without catastrophic cancellation.

use glam::{DVec3, Vec3};

/// Decompose a double into a coarse/residual pair of floats.
///
/// `high` is the double narrowed to f32; `low` is the remainder narrowed to
/// f32. Their sum recovers the input to within f32 rounding at the input's
/// magnitude.
pub fn split_double(value: f64) -> (f32, f32) {
    let high = value as f32;
    let low = (value - high as f64) as f32;
    (high, low)
}

/// A double-precision vector split into coarse and residual f32 vectors.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct HighLow {
    /// Coarse, low-frequency part (the f64 narrowed per component).
    pub high: Vec3,
    /// Residual, high-frequency part (per-component narrowing error).
    pub low: Vec3,
}

impl HighLow {
    /// Split a double-precision vector component-wise.
    pub fn split(v: DVec3) -> Self {
        let (hx, lx) = split_double(v.x);
        let (hy, ly) = split_double(v.y);
        let (hz, lz) = split_double(v.z);
        Self {
            high: Vec3::new(hx, hy, hz),
            low: Vec3::new(lx, ly, lz),
        }
    }

    /// Reconstruct the double-precision vector (exact up to f32 rounding).
    pub fn reconstruct(&self) -> DVec3 {
        self.high.as_dvec3() + self.low.as_dvec3()
    }
}

/// Per-frame camera coordinate frame.
///
/// Holds the authoritative f64 camera position plus the derived f32 values
/// the renderer consumes. The derived values are caches: call
/// [`refresh`](Self::refresh) once per frame, after the camera has moved and
/// before traversal, so every consumer in the frame sees the same snapshot.
#[derive(Clone, Debug)]
pub struct CameraFrame {
    position: DVec3,
    position_f32: Vec3,
    high_low: HighLow,
}

impl CameraFrame {
    /// Create a frame at the given world position, with caches populated.
    pub fn new(position: DVec3) -> Self {
        let mut frame = Self {
            position,
            position_f32: Vec3::ZERO,
            high_low: HighLow::default(),
        };
        frame.refresh();
        frame
    }

    /// Authoritative double-precision camera position.
    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Move the camera. Derived values are stale until [`refresh`](Self::refresh).
    pub fn set_position(&mut self, position: DVec3) {
        self.position = position;
    }

    /// Recompute the derived f32 position and high/low pair from the
    /// current f64 position. Called once per frame before traversal.
    pub fn refresh(&mut self) {
        self.position_f32 = self.position.as_vec3();
        self.high_low = HighLow::split(self.position);
    }

    /// Single-precision camera position as of the last refresh.
    pub fn position_f32(&self) -> Vec3 {
        self.position_f32
    }

    /// High/low decomposition as of the last refresh.
    pub fn high_low(&self) -> HighLow {
        self.high_low
    }

    /// Narrow a world position to camera-relative f32.
    ///
    /// The subtraction happens in f64; only the small camera-relative result
    /// is narrowed, so nearby geometry keeps sub-millimeter precision even
    /// when both operands are planetary-scale.
    pub fn relative_to_camera(&self, world: DVec3) -> Vec3 {
        (world - self.position).as_vec3()
    }
}
