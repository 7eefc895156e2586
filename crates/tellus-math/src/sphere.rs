//! Bounding sphere in f64 world space.

use glam::DVec3;

use crate::DAabb;

/// A bounding sphere: center plus radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DSphere {
    pub center: DVec3,
    pub radius: f64,
}

impl DSphere {
    /// Create a sphere from center and radius.
    ///
    /// # Panics
    ///
    /// Panics if `radius` is negative.
    pub fn new(center: DVec3, radius: f64) -> Self {
        assert!(radius >= 0.0, "sphere radius must be non-negative");
        Self { center, radius }
    }

    /// Returns true if the point lies inside or on the sphere.
    pub fn contains_point(&self, p: DVec3) -> bool {
        self.center.distance_squared(p) <= self.radius * self.radius
    }

    /// Returns true if this sphere overlaps `other` (touching counts).
    pub fn intersects_sphere(&self, other: &DSphere) -> bool {
        let r = self.radius + other.radius;
        self.center.distance_squared(other.center) <= r * r
    }

    /// Returns true if this sphere overlaps the AABB (touching counts).
    ///
    /// Tests the distance from the center to the closest point of the box.
    pub fn intersects_aabb(&self, aabb: &DAabb) -> bool {
        let closest = self.center.clamp(aabb.min, aabb.max);
        self.center.distance_squared(closest) <= self.radius * self.radius
    }

    /// The circumscribing AABB of this sphere.
    pub fn to_aabb(&self) -> DAabb {
        DAabb::from_center_half_extents(self.center, DVec3::splat(self.radius))
    }
}
