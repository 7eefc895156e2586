//! Closed bounding-volume variant with exhaustive pairwise dispatch.
//!
//! The set of volume kinds is small and fixed, so intersection is a single
//! `match` over the pair of kinds rather than a double-dispatch visitor.
//! Adding a kind makes every missing test a compile error.

use glam::{DMat4, DVec3};

use crate::{DAabb, DSphere, Frustum};

/// A bounding volume of one of the supported kinds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundingVolume {
    Aabb(DAabb),
    Sphere(DSphere),
}

impl BoundingVolume {
    /// Returns true if the point lies inside or on the volume.
    pub fn contains_point(&self, p: DVec3) -> bool {
        match self {
            BoundingVolume::Aabb(aabb) => aabb.contains_point(p),
            BoundingVolume::Sphere(sphere) => sphere.contains_point(p),
        }
    }

    /// Pairwise intersection test, exhaustive over the kind matrix.
    pub fn intersects(&self, other: &BoundingVolume) -> bool {
        match (self, other) {
            (BoundingVolume::Aabb(a), BoundingVolume::Aabb(b)) => a.intersects(b),
            (BoundingVolume::Aabb(a), BoundingVolume::Sphere(s)) => s.intersects_aabb(a),
            (BoundingVolume::Sphere(s), BoundingVolume::Aabb(a)) => s.intersects_aabb(a),
            (BoundingVolume::Sphere(a), BoundingVolume::Sphere(b)) => a.intersects_sphere(b),
        }
    }

    /// Returns true if the volume is at least partially inside the frustum.
    pub fn intersects_frustum(&self, frustum: &Frustum) -> bool {
        match self {
            BoundingVolume::Aabb(aabb) => frustum.intersects_aabb(aabb),
            BoundingVolume::Sphere(sphere) => frustum.intersects_sphere(sphere),
        }
    }

    /// The circumscribing AABB of this volume.
    pub fn to_aabb(&self) -> DAabb {
        match self {
            BoundingVolume::Aabb(aabb) => *aabb,
            BoundingVolume::Sphere(sphere) => sphere.to_aabb(),
        }
    }

    /// Smallest AABB volume enclosing both inputs.
    ///
    /// Unions collapse to the AABB kind; aggregate volumes in the scene
    /// graph only ever need the conservative box.
    pub fn union(&self, other: &BoundingVolume) -> BoundingVolume {
        BoundingVolume::Aabb(self.to_aabb().union(&other.to_aabb()))
    }

    /// A zero-size volume at a point, for nodes with no geometry of their own.
    pub fn point(p: DVec3) -> BoundingVolume {
        BoundingVolume::Sphere(DSphere::new(p, 0.0))
    }

    /// The volume mapped through an affine transform, conservatively.
    ///
    /// A box is re-boxed from its eight transformed corners; a sphere keeps
    /// its shape, with the radius scaled by the largest axis scale so a
    /// non-uniform transform can only grow it.
    pub fn transformed(&self, m: &DMat4) -> BoundingVolume {
        match self {
            BoundingVolume::Aabb(aabb) => {
                let (lo, hi) = (aabb.min, aabb.max);
                let corners = [
                    DVec3::new(lo.x, lo.y, lo.z),
                    DVec3::new(hi.x, lo.y, lo.z),
                    DVec3::new(lo.x, hi.y, lo.z),
                    DVec3::new(hi.x, hi.y, lo.z),
                    DVec3::new(lo.x, lo.y, hi.z),
                    DVec3::new(hi.x, lo.y, hi.z),
                    DVec3::new(lo.x, hi.y, hi.z),
                    DVec3::new(hi.x, hi.y, hi.z),
                ]
                .map(|c| m.transform_point3(c));
                BoundingVolume::Aabb(DAabb::from_points(&corners))
            }
            BoundingVolume::Sphere(sphere) => {
                let scale = m
                    .x_axis
                    .truncate()
                    .length()
                    .max(m.y_axis.truncate().length())
                    .max(m.z_axis.truncate().length());
                BoundingVolume::Sphere(DSphere::new(
                    m.transform_point3(sphere.center),
                    sphere.radius * scale,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_kind_intersection_is_symmetric() {
        let aabb = BoundingVolume::Aabb(DAabb::new(DVec3::ZERO, DVec3::splat(10.0)));
        let sphere = BoundingVolume::Sphere(DSphere::new(DVec3::new(12.0, 5.0, 5.0), 3.0));
        assert!(aabb.intersects(&sphere));
        assert!(sphere.intersects(&aabb));

        let far = BoundingVolume::Sphere(DSphere::new(DVec3::splat(100.0), 3.0));
        assert!(!aabb.intersects(&far));
        assert!(!far.intersects(&aabb));
    }

    #[test]
    fn test_union_encloses_both_kinds() {
        let aabb = BoundingVolume::Aabb(DAabb::new(DVec3::ZERO, DVec3::splat(2.0)));
        let sphere = BoundingVolume::Sphere(DSphere::new(DVec3::splat(10.0), 1.0));
        let u = aabb.union(&sphere);
        assert!(u.contains_point(DVec3::ZERO));
        assert!(u.contains_point(DVec3::splat(11.0)));
    }

    #[test]
    fn test_transformed_sphere_follows_translation_and_scale() {
        let v = BoundingVolume::Sphere(DSphere::new(DVec3::ZERO, 2.0));
        let m = DMat4::from_translation(DVec3::new(100.0, 0.0, 0.0))
            * DMat4::from_scale(DVec3::new(3.0, 1.0, 1.0));
        let BoundingVolume::Sphere(moved) = v.transformed(&m) else {
            panic!("sphere must stay a sphere");
        };
        assert_eq!(moved.center, DVec3::new(100.0, 0.0, 0.0));
        assert_eq!(moved.radius, 6.0, "radius takes the largest axis scale");
    }

    #[test]
    fn test_transformed_aabb_encloses_rotated_box() {
        let v = BoundingVolume::Aabb(DAabb::new(DVec3::splat(-1.0), DVec3::splat(1.0)));
        let m = DMat4::from_rotation_z(std::f64::consts::FRAC_PI_4);
        let rotated = v.transformed(&m);
        // Every original corner, rotated, is inside the new box.
        for &sx in &[-1.0, 1.0] {
            for &sy in &[-1.0, 1.0] {
                let corner = m.transform_point3(DVec3::new(sx, sy, 1.0));
                assert!(rotated.contains_point(corner));
            }
        }
        // Identity is a no-op.
        assert_eq!(v.transformed(&DMat4::IDENTITY), v);
    }

    #[test]
    fn test_point_volume_contains_only_itself() {
        let p = DVec3::new(3.0, 4.0, 5.0);
        let v = BoundingVolume::point(p);
        assert!(v.contains_point(p));
        assert!(!v.contains_point(p + DVec3::X));
    }
}
