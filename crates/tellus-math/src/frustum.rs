//! View frustum extraction and containment tests in f64.

use glam::{DMat4, DVec3, DVec4};

use crate::{DAabb, DSphere};

/// Plane indices into the frustum planes array.
const LEFT: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const NEAR: usize = 4;
const FAR: usize = 5;

/// A view frustum defined by six inward-pointing planes extracted from a
/// double-precision view-projection matrix.
///
/// Culling against planet-scale geometry happens before any narrowing to
/// f32, so the planes are kept in f64 like every other world quantity.
#[derive(Clone, Debug)]
pub struct Frustum {
    /// Six planes: left, right, bottom, top, near, far.
    /// Each `DVec4(a, b, c, d)` where `(a,b,c)` is the normalized inward
    /// normal and `d` is the signed distance term.
    planes: [DVec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a combined view-projection matrix using
    /// the Gribb-Hartmann method. Works for perspective and orthographic
    /// projections.
    pub fn from_view_projection(vp: &DMat4) -> Self {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];

        let mut planes = [DVec4::ZERO; 6];
        planes[LEFT] = rows[3] + rows[0];
        planes[RIGHT] = rows[3] - rows[0];
        planes[BOTTOM] = rows[3] + rows[1];
        planes[TOP] = rows[3] - rows[1];
        // glam's projection matrices emit 0..1 clip depth, so the near
        // plane is `z_clip >= 0`, i.e. row 2 alone; `rows[3] + rows[2]`
        // would be the -1..1 (GL) convention and puts the near plane at
        // half the configured near distance.
        planes[NEAR] = rows[2];
        planes[FAR] = rows[3] - rows[2];

        // Normalize each plane so that (a,b,c) is a unit vector.
        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 0.0 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    /// Returns true if the point is inside or on all six planes.
    pub fn contains_point(&self, p: DVec3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(p) + plane.w >= 0.0)
    }

    /// Test whether an AABB is at least partially inside the frustum.
    ///
    /// Uses the p-vertex method: for each plane, test the corner of the box
    /// furthest along the plane normal. Conservative near frustum corners
    /// (may report a fully-outside box as visible) but never culls a
    /// visible one.
    pub fn intersects_aabb(&self, aabb: &DAabb) -> bool {
        for plane in &self.planes {
            let normal = plane.truncate();
            let p = DVec3::new(
                if normal.x >= 0.0 { aabb.max.x } else { aabb.min.x },
                if normal.y >= 0.0 { aabb.max.y } else { aabb.min.y },
                if normal.z >= 0.0 { aabb.max.z } else { aabb.min.z },
            );
            if normal.dot(p) + plane.w < 0.0 {
                return false;
            }
        }
        true
    }

    /// Test whether a sphere is at least partially inside the frustum.
    pub fn intersects_sphere(&self, sphere: &DSphere) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.truncate().dot(sphere.center) + plane.w >= -sphere.radius)
    }
}
