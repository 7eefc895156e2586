//! One patch of planet surface at one LOD level.

use glam::DVec3;
use tracing::trace;

use tellus_math::{DAabb, Frustum, Geodetic};

use crate::scheme::{SubdivisionScheme, TerrainParams};

/// Depth at which subdivision stops. Reaching it is not an error; a node at
/// this depth simply remains a leaf.
pub const MAX_DEPTH: u8 = 19;

/// Which quadrant of its parent a node covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    BottomLeft,
    BottomRight,
    TopLeft,
    TopRight,
}

impl Quadrant {
    /// All quadrants in child-array order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
        Quadrant::TopLeft,
        Quadrant::TopRight,
    ];
}

/// The four lat/lon corners of a patch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadCorners {
    pub bottom_left: Geodetic,
    pub bottom_right: Geodetic,
    pub top_left: Geodetic,
    pub top_right: Geodetic,
}

impl QuadCorners {
    /// Build a lat/lon-aligned quad from its bottom-left and top-right
    /// corners, deriving the other two.
    pub fn from_span(bottom_left: Geodetic, top_right: Geodetic) -> Self {
        Self {
            bottom_left,
            bottom_right: Geodetic::new(bottom_left.lat, top_right.lon),
            top_left: Geodetic::new(top_right.lat, bottom_left.lon),
            top_right,
        }
    }

    /// Corners in child-array order: bottom-left, bottom-right, top-left,
    /// top-right.
    pub fn as_array(&self) -> [Geodetic; 4] {
        [
            self.bottom_left,
            self.bottom_right,
            self.top_left,
            self.top_right,
        ]
    }

    /// Component-wise average of the four corners in lat/lon space.
    pub fn center(&self) -> Geodetic {
        let corners = self.as_array();
        let lat = corners.iter().map(|c| c.lat).sum::<f64>() * 0.25;
        let lon = corners.iter().map(|c| c.lon).sum::<f64>() * 0.25;
        Geodetic::new(lat, lon)
    }

    /// Lat/lon-space extent as (lat span, lon span) in radians.
    pub fn flat_extent(&self) -> (f64, f64) {
        (
            (self.top_left.lat - self.bottom_left.lat).abs(),
            (self.bottom_right.lon - self.bottom_left.lon).abs(),
        )
    }

    /// The four corners projected onto the sphere of the given radius.
    pub fn projected(&self, radius: f64) -> [DVec3; 4] {
        self.as_array().map(|c| c.to_cartesian(radius))
    }
}

/// A terrain quadtree node: one surface patch at one LOD level.
///
/// Parent owns children. Children are allocated lazily on the first split
/// and retained for the node's lifetime; collapsing only clears
/// [`is_split`](Self::is_split). With bounded depth this trades a finite
/// amount of memory for never re-subdividing a revisited region.
#[derive(Debug)]
pub struct TerrainQuadNode {
    corners: QuadCorners,
    center: Geodetic,
    depth: u8,
    quadrant: Option<Quadrant>,
    /// Tight world-space bounds of the projected corners (depth 0 may be
    /// overridden by the subdivision scheme).
    aabb: DAabb,
    /// The AABB inflated about its center; the camera being inside this box
    /// is the split trigger, leaving it the collapse trigger.
    split_box: DAabb,
    /// Approximate projected size of the patch in meters (diagonal arc).
    projected_extent_m: f64,
    is_split: bool,
    children: Option<Box<[TerrainQuadNode; 4]>>,
}

impl TerrainQuadNode {
    /// Create a depth-0 root covering the given span. Bounds come from the
    /// scheme's root-bounds hook.
    pub fn new_root(
        corners: QuadCorners,
        scheme: &SubdivisionScheme,
        params: &TerrainParams,
    ) -> Self {
        let (aabb, split_box) = (scheme.root_bounds)(&corners, params);
        Self::assemble(corners, 0, None, aabb, split_box, params)
    }

    fn new_child(corners: QuadCorners, depth: u8, quadrant: Quadrant, params: &TerrainParams) -> Self {
        let aabb = DAabb::from_points(&corners.projected(params.radius));
        let split_box = aabb.inflated(params.split_factor);
        Self::assemble(corners, depth, Some(quadrant), aabb, split_box, params)
    }

    fn assemble(
        corners: QuadCorners,
        depth: u8,
        quadrant: Option<Quadrant>,
        aabb: DAabb,
        split_box: DAabb,
        params: &TerrainParams,
    ) -> Self {
        let center = corners.center();
        let (lat_span, lon_span) = corners.flat_extent();
        let projected_extent_m = lat_span.hypot(lon_span) * params.radius;
        Self {
            corners,
            center,
            depth,
            quadrant,
            aabb,
            split_box,
            projected_extent_m,
            is_split: false,
            children: None,
        }
    }

    pub fn corners(&self) -> &QuadCorners {
        &self.corners
    }

    pub fn center(&self) -> Geodetic {
        self.center
    }

    pub fn depth(&self) -> u8 {
        self.depth
    }

    pub fn quadrant(&self) -> Option<Quadrant> {
        self.quadrant
    }

    pub fn aabb(&self) -> &DAabb {
        &self.aabb
    }

    pub fn split_box(&self) -> &DAabb {
        &self.split_box
    }

    /// Approximate patch size in projected meters.
    pub fn projected_extent_m(&self) -> f64 {
        self.projected_extent_m
    }

    /// Whether this node currently renders as four children instead of one
    /// patch.
    pub fn is_split(&self) -> bool {
        self.is_split
    }

    /// Whether children have ever been allocated (they persist across
    /// collapses).
    pub fn has_children(&self) -> bool {
        self.children.is_some()
    }

    /// The four children, if ever allocated.
    pub fn children(&self) -> Option<&[TerrainQuadNode; 4]> {
        self.children.as_deref()
    }

    /// Per-frame split/collapse decision against the camera position.
    ///
    /// A split node whose split box no longer contains the camera collapses
    /// (children retained); otherwise it recurses. A leaf whose split box
    /// contains the camera subdivides, unless it is already at the maximum
    /// depth, in which case it simply stays a leaf.
    pub fn update(
        &mut self,
        camera: DVec3,
        scheme: &SubdivisionScheme,
        params: &TerrainParams,
    ) {
        if self.is_split {
            if !self.split_box.contains_point(camera) {
                self.is_split = false;
                return;
            }
        } else {
            if !self.split_box.contains_point(camera) || self.depth >= params.max_depth {
                return;
            }
            self.ensure_children(scheme, params);
            self.is_split = true;
        }

        // Unwrap is safe: is_split implies children were allocated.
        let children = self.children.as_deref_mut().expect("split node without children");
        for child in children.iter_mut() {
            child.update(camera, scheme, params);
        }
    }

    /// True iff this node's AABB intersects the frustum.
    pub fn is_visible(&self, frustum: &Frustum) -> bool {
        frustum.intersects_aabb(&self.aabb)
    }

    /// Collect the visible leaves of the currently-chosen LOD: prune
    /// invisible subtrees, recurse through split nodes, emit leaves.
    pub fn collect_visible_leaves<'a>(
        &'a self,
        frustum: &Frustum,
        out: &mut Vec<&'a TerrainQuadNode>,
    ) {
        if !self.is_visible(frustum) {
            return;
        }
        match (self.is_split, self.children.as_deref()) {
            (true, Some(children)) => {
                for child in children {
                    child.collect_visible_leaves(frustum, out);
                }
            }
            _ => out.push(self),
        }
    }

    /// Current leaves regardless of visibility.
    pub fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a TerrainQuadNode>) {
        match (self.is_split, self.children.as_deref()) {
            (true, Some(children)) => {
                for child in children {
                    child.collect_leaves(out);
                }
            }
            _ => out.push(self),
        }
    }

    /// Deepest depth reached anywhere in the allocated subtree.
    pub fn deepest_allocated(&self) -> u8 {
        match self.children.as_deref() {
            Some(children) => children
                .iter()
                .map(TerrainQuadNode::deepest_allocated)
                .max()
                .unwrap_or(self.depth),
            None => self.depth,
        }
    }

    /// Allocate the four children on first use via midpoint subdivision.
    ///
    /// The left/right/top/bottom edge midpoints and the center (midpoint of
    /// the left and right edge midpoints) are computed once and shared, so
    /// adjacent children agree exactly on their shared corners.
    fn ensure_children(&mut self, scheme: &SubdivisionScheme, params: &TerrainParams) {
        if self.children.is_some() {
            return;
        }

        let mid = scheme.corner_midpoint;
        let c = &self.corners;
        let left = mid(&c.bottom_left, &c.top_left);
        let right = mid(&c.bottom_right, &c.top_right);
        let bottom = mid(&c.bottom_left, &c.bottom_right);
        let top = mid(&c.top_left, &c.top_right);
        let center = mid(&left, &right);

        let child_depth = self.depth + 1;
        let corner_sets = [
            QuadCorners {
                bottom_left: c.bottom_left,
                bottom_right: bottom,
                top_left: left,
                top_right: center,
            },
            QuadCorners {
                bottom_left: bottom,
                bottom_right: c.bottom_right,
                top_left: center,
                top_right: right,
            },
            QuadCorners {
                bottom_left: left,
                bottom_right: center,
                top_left: c.top_left,
                top_right: top,
            },
            QuadCorners {
                bottom_left: center,
                bottom_right: right,
                top_left: top,
                top_right: c.top_right,
            },
        ];

        let mut quadrants = Quadrant::ALL.iter();
        self.children = Some(Box::new(corner_sets.map(|corners| {
            let quadrant = *quadrants.next().expect("four quadrants");
            TerrainQuadNode::new_child(corners, child_depth, quadrant, params)
        })));

        trace!(
            depth = child_depth,
            extent_m = self.projected_extent_m * 0.5,
            "allocated terrain children"
        );
    }
}
