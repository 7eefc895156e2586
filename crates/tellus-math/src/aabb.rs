//! Axis-aligned bounding box in f64 world space.

use glam::DVec3;

/// Axis-aligned bounding box in double-precision world space.
///
/// Invariant: `min.x <= max.x`, `min.y <= max.y`, `min.z <= max.z`.
/// The constructor enforces this by sorting components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DAabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl DAabb {
    /// Create an AABB from two corners. Automatically sorts components so
    /// that min <= max on every axis.
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Create an AABB from a center point and half-extents.
    pub fn from_center_half_extents(center: DVec3, half: DVec3) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Tight AABB around a set of points.
    ///
    /// # Panics
    ///
    /// Panics if `points` is empty.
    pub fn from_points(points: &[DVec3]) -> Self {
        assert!(!points.is_empty(), "AABB needs at least one point");
        let mut min = points[0];
        let mut max = points[0];
        for p in &points[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    /// Returns the center point of the AABB.
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Returns the half-extents (half-size along each axis).
    pub fn half_extents(&self) -> DVec3 {
        (self.max - self.min) * 0.5
    }

    /// Returns true if the point lies inside or on the boundary.
    pub fn contains_point(&self, p: DVec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Returns true if this AABB overlaps `other`, counting shared
    /// faces/edges as an intersection.
    pub fn intersects(&self, other: &DAabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Returns true only if the interiors overlap: boxes that merely share
    /// a face, edge, or corner do not count.
    pub fn intersects_strictly(&self, other: &DAabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Returns the smallest AABB enclosing both self and other.
    pub fn union(&self, other: &DAabb) -> DAabb {
        DAabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns a copy scaled by `factor` about its center.
    ///
    /// A factor > 1 produces a box that strictly contains the original on
    /// every non-degenerate axis.
    pub fn inflated(&self, factor: f64) -> DAabb {
        let center = self.center();
        let half = self.half_extents() * factor;
        Self::from_center_half_extents(center, half)
    }

    /// Returns true if the AABB is effectively flat on at least one axis.
    ///
    /// Sphere projections of coincident points leave femtometer-scale
    /// extents rather than exact zeros, so flatness is judged relative to
    /// the box's largest extent instead of by exact comparison.
    pub fn is_degenerate(&self) -> bool {
        let size = self.max - self.min;
        let scale = size.max_element().max(1.0);
        size.min_element() <= scale * 1e-12
    }
}
