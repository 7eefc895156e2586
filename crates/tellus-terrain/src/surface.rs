//! A renderable terrain surface: root regions, per-frame update, and the
//! shared vertex batch that visible leaves are packed into.

use glam::{DVec3, Mat4};
use tracing::{debug, info, warn};

use tellus_math::{DAabb, Frustum, Geodetic};
use tellus_render::{
    BufferId, GeometryRef, GraphicsContext, MaterialId, PrimitiveTopology, RenderCommand,
    RenderQueues, StateOverrides, SurfaceVertex,
};

use crate::node::{QuadCorners, TerrainQuadNode};
use crate::scheme::{SubdivisionScheme, TerrainParams};

/// Worst-case number of leaves packed into the shared vertex buffer in one
/// frame. The buffer is allocated once at this size and reused.
pub const MAX_LEAVES_PER_FRAME: usize = 4096;

/// Vertices per leaf: the four patch corners.
const VERTICES_PER_LEAF: usize = 4;

/// One planet's terrain surface: a set of root quadtree regions sharing a
/// subdivision scheme, parameters, and a reused vertex batch.
pub struct TerrainSurface {
    roots: Vec<TerrainQuadNode>,
    scheme: SubdivisionScheme,
    params: TerrainParams,
    buffer: BufferId,
    material: MaterialId,
    /// Reused every frame; capacity is the documented worst case.
    batch: Vec<SurfaceVertex>,
}

impl TerrainSurface {
    /// Build a surface from explicit root spans (bottom-left/top-right
    /// geodetic pairs), all sharing one scheme.
    pub fn from_regions(
        spans: &[(Geodetic, Geodetic)],
        scheme: SubdivisionScheme,
        params: TerrainParams,
        buffer: BufferId,
        material: MaterialId,
    ) -> Self {
        let roots: Vec<TerrainQuadNode> = spans
            .iter()
            .map(|(bottom_left, top_right)| {
                TerrainQuadNode::new_root(
                    QuadCorners::from_span(*bottom_left, *top_right),
                    &scheme,
                    &params,
                )
            })
            .collect();

        info!(
            roots = roots.len(),
            radius_m = params.radius,
            split_factor = params.split_factor,
            max_depth = params.max_depth,
            "terrain surface initialized"
        );

        Self {
            roots,
            scheme,
            params,
            buffer,
            material,
            batch: Vec::with_capacity(MAX_LEAVES_PER_FRAME * VERTICES_PER_LEAF),
        }
    }

    /// The conventional two-hemisphere planet: west (lon [-180°, 0°]) and
    /// east (lon [0°, 180°]) roots.
    pub fn hemispheres(params: TerrainParams, buffer: BufferId, material: MaterialId) -> Self {
        Self::from_regions(
            &[
                (
                    Geodetic::from_degrees(-90.0, -180.0),
                    Geodetic::from_degrees(90.0, 0.0),
                ),
                (
                    Geodetic::from_degrees(-90.0, 0.0),
                    Geodetic::from_degrees(90.0, 180.0),
                ),
            ],
            SubdivisionScheme::hemisphere(),
            params,
            buffer,
            material,
        )
    }

    /// Root regions (read-only).
    pub fn roots(&self) -> &[TerrainQuadNode] {
        &self.roots
    }

    /// Tree parameters.
    pub fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Conservative world bounds of the whole surface: the union of the
    /// root AABBs.
    pub fn bounds(&self) -> DAabb {
        self.roots
            .iter()
            .map(|root| *root.aabb())
            .reduce(|a, b| a.union(&b))
            .unwrap_or(DAabb::new(DVec3::ZERO, DVec3::ZERO))
    }

    /// Per-frame LOD update: run the split/collapse decision over every
    /// root region against the camera position.
    pub fn update(&mut self, camera: DVec3) {
        for root in &mut self.roots {
            root.update(camera, &self.scheme, &self.params);
        }
    }

    /// The leaves that should be rasterized this frame, across all roots.
    pub fn visible_leaves(&self, frustum: &Frustum) -> Vec<&TerrainQuadNode> {
        let mut leaves = Vec::new();
        for root in &self.roots {
            root.collect_visible_leaves(frustum, &mut leaves);
        }
        leaves
    }

    /// Pack the visible leaves into the shared vertex batch, upload it, and
    /// enqueue one normal-pass command referencing the whole set.
    ///
    /// Zero visible leaves is valid and enqueues nothing. More leaves than
    /// the worst-case buffer size is a symptom of a mis-tuned split factor;
    /// the excess is dropped with a warning rather than reallocating
    /// mid-frame.
    pub fn queue_commands(
        &mut self,
        frustum: &Frustum,
        queues: &mut RenderQueues,
        gfx: &mut dyn GraphicsContext,
    ) {
        // Borrow roots and the batch as disjoint fields: the leaf
        // references point into `self.roots` while `self.batch` is filled.
        let mut leaves: Vec<&TerrainQuadNode> = Vec::new();
        for root in &self.roots {
            root.collect_visible_leaves(frustum, &mut leaves);
        }
        if leaves.len() > MAX_LEAVES_PER_FRAME {
            warn!(
                visible = leaves.len(),
                budget = MAX_LEAVES_PER_FRAME,
                "visible leaf count exceeds the vertex budget; truncating"
            );
            leaves.truncate(MAX_LEAVES_PER_FRAME);
        }
        if leaves.is_empty() {
            return;
        }

        self.batch.clear();
        for leaf in &leaves {
            let c = leaf.corners();
            self.batch.extend_from_slice(&[
                corner_vertex(c.bottom_left, 0.0, 0.0),
                corner_vertex(c.bottom_right, 1.0, 0.0),
                corner_vertex(c.top_left, 0.0, 1.0),
                corner_vertex(c.top_right, 1.0, 1.0),
            ]);
        }

        debug!(leaves = leaves.len(), vertices = self.batch.len(), "terrain batch");
        gfx.upload_vertices(self.buffer, &self.batch);
        queues.enqueue_normal(RenderCommand {
            geometry: GeometryRef {
                buffer: self.buffer,
                vertices: 0..self.batch.len() as u32,
            },
            topology: PrimitiveTopology::QuadPatchList,
            material: self.material,
            // Patch positions are geodetic radians; the vertex stage
            // projects them with the camera's high/low pair, so no
            // per-command transform is needed.
            transform: Mat4::IDENTITY,
            state: StateOverrides::default(),
        });
    }
}

fn corner_vertex(corner: Geodetic, u: f32, v: f32) -> SurfaceVertex {
    SurfaceVertex::new(corner.lon as f32, corner.lat as f32, u, v)
}
