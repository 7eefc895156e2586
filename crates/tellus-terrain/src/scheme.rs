//! Subdivision strategy: the two behaviors that genuinely vary per root kind.
//!
//! The quadtree algorithm itself lives in one place (`node.rs`); the only
//! things a specialized root ever changes are how corner midpoints are
//! produced and how the depth-0 bounds are constructed. Both are carried by
//! a small strategy object selected at root-construction time.

use glam::DVec3;
use tellus_math::{DAabb, Geodetic};

use crate::node::QuadCorners;

/// Fixed parameters shared by every node of one terrain tree.
#[derive(Clone, Copy, Debug)]
pub struct TerrainParams {
    /// Planet radius in meters.
    pub radius: f64,
    /// Split-box inflation factor. Must be > 1 so the split box strictly
    /// contains the tight AABB; the margin is what prevents split/collapse
    /// oscillation when the camera sits on a patch boundary.
    pub split_factor: f64,
    /// Depth at which nodes stop splitting. Clamped to [`crate::MAX_DEPTH`].
    pub max_depth: u8,
}

impl TerrainParams {
    /// Create parameters, validating the hysteresis precondition.
    ///
    /// # Panics
    ///
    /// Panics if `radius` is not positive or `split_factor <= 1.0`.
    pub fn new(radius: f64, split_factor: f64, max_depth: u8) -> Self {
        assert!(radius > 0.0, "planet radius must be positive");
        assert!(
            split_factor > 1.0,
            "split factor must exceed 1.0, got {split_factor}"
        );
        Self {
            radius,
            split_factor,
            max_depth: max_depth.min(crate::MAX_DEPTH),
        }
    }

    /// Earth-like defaults: 6 371 km radius, 1.2 inflation, full depth.
    pub fn earth() -> Self {
        Self::new(6_371_000.0, 1.2, crate::MAX_DEPTH)
    }
}

/// Corner-subdivision and initial-bounds strategy for one terrain tree.
///
/// `corner_midpoint` produces the edge/center midpoints used when a node
/// allocates its children. `root_bounds` produces the depth-0
/// `(aabb, split_box)` pair; deeper nodes always derive their bounds from
/// their own projected corners.
#[derive(Clone, Copy)]
pub struct SubdivisionScheme {
    /// Midpoint of two corners, used for edge and center subdivision.
    pub corner_midpoint: fn(&Geodetic, &Geodetic) -> Geodetic,
    /// Bounds for the depth-0 node: `(aabb, split_box)`.
    pub root_bounds: fn(&QuadCorners, &TerrainParams) -> (DAabb, DAabb),
}

impl SubdivisionScheme {
    /// Strategy for ordinary interior patches: great-circle chord midpoints
    /// and bounds from the projected corners.
    pub fn patch() -> Self {
        Self {
            corner_midpoint: great_circle_midpoint,
            root_bounds: corner_bounds,
        }
    }

    /// Strategy for hemisphere roots.
    ///
    /// A hemisphere's four corners all sit at the poles, so projecting them
    /// yields a degenerate flat box; the depth-0 bounds are therefore the
    /// full-sphere box instead. Midpoints are unchanged.
    pub fn hemisphere() -> Self {
        Self {
            corner_midpoint: great_circle_midpoint,
            root_bounds: sphere_bounds,
        }
    }
}

impl std::fmt::Debug for SubdivisionScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubdivisionScheme").finish_non_exhaustive()
    }
}

fn great_circle_midpoint(a: &Geodetic, b: &Geodetic) -> Geodetic {
    a.midpoint(b)
}

/// Tight AABB from the projected corners, split box inflated from it.
fn corner_bounds(corners: &QuadCorners, params: &TerrainParams) -> (DAabb, DAabb) {
    let aabb = DAabb::from_points(&corners.projected(params.radius));
    let split_box = aabb.inflated(params.split_factor);
    (aabb, split_box)
}

/// Full-sphere AABB regardless of corners, split box inflated from it.
fn sphere_bounds(_corners: &QuadCorners, params: &TerrainParams) -> (DAabb, DAabb) {
    let aabb = DAabb::from_center_half_extents(DVec3::ZERO, DVec3::splat(params.radius));
    let split_box = aabb.inflated(params.split_factor);
    (aabb, split_box)
}
