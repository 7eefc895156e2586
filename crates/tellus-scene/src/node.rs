//! Scene node: kind, transforms, and the bounding volumes culling sees.

use glam::{DMat4, Mat4};
use tellus_coords::CameraFrame;
use tellus_math::{BoundingVolume, Frustum};
use tellus_render::{GraphicsContext, RenderCommand, RenderQueues};
use tellus_terrain::TerrainSurface;

use crate::id_pool::NodeId;

/// Which of the two per-frame queues a primitive's command lands in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    /// Rendered against the intermediate target before the main pass.
    Deferred,
    /// Rendered against the main target.
    Normal,
}

/// A fixed piece of geometry drawn when its node is visible.
#[derive(Clone, Debug)]
pub struct PrimitiveNode {
    pub command: RenderCommand,
    pub pass: Pass,
    /// Bounds of the geometry in the node's local space; the node's world
    /// transform carries them (and the command) into world space.
    pub volume: BoundingVolume,
}

/// What a node contributes to the frame.
pub enum NodeKind {
    /// Pure hierarchy: transforms and aggregate bounds only.
    Group,
    /// An adaptive planet surface; updates its own LOD every frame.
    Terrain(TerrainSurface),
    /// A pre-built command enqueued verbatim.
    Primitive(PrimitiveNode),
}

impl NodeKind {
    /// The node's own local-space bounds, before any children are unioned
    /// in. Groups contribute nothing, so they carry a degenerate point.
    /// Terrain generates geometry directly in world space, so its bounds
    /// pass through the node transform unchanged.
    fn local_volume(&self) -> BoundingVolume {
        match self {
            NodeKind::Group => BoundingVolume::point(glam::DVec3::ZERO),
            NodeKind::Terrain(surface) => BoundingVolume::Aabb(surface.bounds()),
            NodeKind::Primitive(primitive) => primitive.volume,
        }
    }
}

impl std::fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeKind::Group => write!(f, "Group"),
            NodeKind::Terrain(_) => write!(f, "Terrain"),
            NodeKind::Primitive(_) => write!(f, "Primitive"),
        }
    }
}

/// One node of the scene tree.
///
/// `world_transform` and `aggregate_volume` are derived state, refreshed by
/// [`crate::SceneGraph::update`]; reading them before the first update gives
/// the node's own local values.
pub struct SceneNode {
    pub(crate) id: NodeId,
    pub(crate) name: String,
    pub(crate) kind: NodeKind,
    pub(crate) local_transform: DMat4,
    pub(crate) world_transform: DMat4,
    /// The kind's bounds in the node's local space.
    pub(crate) local_volume: BoundingVolume,
    /// Local volume carried into world space by the last-composed world
    /// transform.
    pub(crate) own_volume: BoundingVolume,
    /// Own volume unioned with every descendant's aggregate.
    pub(crate) aggregate_volume: BoundingVolume,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl SceneNode {
    pub(crate) fn new(id: NodeId, name: String, kind: NodeKind) -> Self {
        let local_volume = kind.local_volume();
        Self {
            id,
            name,
            kind,
            local_transform: DMat4::IDENTITY,
            world_transform: DMat4::IDENTITY,
            local_volume,
            own_volume: local_volume,
            aggregate_volume: local_volume,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn local_transform(&self) -> DMat4 {
        self.local_transform
    }

    pub fn set_local_transform(&mut self, transform: DMat4) {
        self.local_transform = transform;
    }

    /// Transform composed down from the root, as of the last update.
    pub fn world_transform(&self) -> DMat4 {
        self.world_transform
    }

    /// Bounds of this node and its whole subtree, as of the last update.
    pub fn aggregate_volume(&self) -> &BoundingVolume {
        &self.aggregate_volume
    }

    /// Replace the node's local-space bounds, for kinds whose geometry
    /// changed shape. The world-space volume follows at the next update.
    pub fn set_local_volume(&mut self, volume: BoundingVolume) {
        self.local_volume = volume;
    }

    /// Kind-specific per-frame work, run on the way down the tree.
    pub(crate) fn run_update(&mut self, _dt: f64, camera: &CameraFrame) {
        if let NodeKind::Terrain(surface) = &mut self.kind {
            surface.update(camera.position());
        }
    }

    /// Re-derive the world-space own volume from the local volume and the
    /// just-composed world transform. Runs every enter visit so culling
    /// always sees where the geometry currently is.
    pub(crate) fn refresh_world_volume(&mut self) {
        self.own_volume = match &self.kind {
            // Terrain geometry is generated in world space already.
            NodeKind::Terrain(_) => self.local_volume,
            _ => self.local_volume.transformed(&self.world_transform),
        };
    }

    /// Append this node's commands for the frame. Called only after the
    /// node has passed the frustum test.
    pub(crate) fn queue_commands(
        &mut self,
        frustum: &Frustum,
        camera: &CameraFrame,
        queues: &mut RenderQueues,
        gfx: &mut dyn GraphicsContext,
    ) {
        match &mut self.kind {
            NodeKind::Group => {}
            NodeKind::Terrain(surface) => surface.queue_commands(frustum, queues, gfx),
            NodeKind::Primitive(primitive) => {
                let mut command = primitive.command.clone();
                command.transform =
                    camera_relative_transform(&self.world_transform, camera) * command.transform;
                match primitive.pass {
                    Pass::Deferred => queues.enqueue_deferred(command),
                    Pass::Normal => queues.enqueue_normal(command),
                }
            }
        }
    }
}

/// Narrow a world transform to f32 with its translation re-expressed
/// relative to the camera: the rotation/scale block narrows directly, the
/// translation is subtracted in f64 first so nearby nodes keep sub-meter
/// precision at planetary coordinates.
fn camera_relative_transform(world: &DMat4, camera: &CameraFrame) -> Mat4 {
    let translation = world.w_axis.truncate();
    let mut m = world.as_mat4();
    m.w_axis = camera.relative_to_camera(translation).extend(1.0);
    m
}
