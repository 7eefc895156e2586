//! The scene tree and its two per-frame traversals.

use std::collections::HashMap;

use glam::DMat4;
use tracing::{debug, trace};

use tellus_coords::CameraFrame;
use tellus_math::Frustum;
use tellus_render::{GraphicsContext, RenderQueues};

use crate::error::SceneError;
use crate::id_pool::{IdPool, NodeId};
use crate::node::{NodeKind, SceneNode};

/// Everything the render traversal needs about the frame being built.
#[derive(Clone, Debug)]
pub struct FrameContext {
    /// Monotonic frame counter, for logging.
    pub index: u64,
    /// Culling frustum, in the same world space as the aggregate volumes.
    pub frustum: Frustum,
    /// Camera snapshot used to re-express command transforms relative to
    /// the eye before narrowing to f32.
    pub camera: CameraFrame,
}

/// Phases of the non-recursive update walk. Every node is visited exactly
/// twice per frame: once on the way down, once on the way back up.
enum Visit {
    /// Compose the world transform and run kind-specific work.
    Enter,
    /// Fold children's aggregate volumes into this node's.
    Exit,
}

/// A forest of scene nodes with recycled ids.
///
/// Structural edits (`attach`, `reparent`, `destroy`) validate fully before
/// mutating, so a returned [`SceneError`] leaves the graph untouched.
pub struct SceneGraph {
    nodes: HashMap<NodeId, SceneNode>,
    roots: Vec<NodeId>,
    pool: IdPool,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            roots: Vec::new(),
            pool: IdPool::new(),
        }
    }

    /// Create a node with no parent. It becomes a root until attached.
    pub fn create_node(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        let id = self.pool.allocate();
        let node = SceneNode::new(id, name.into(), kind);
        trace!(%id, name = %node.name, kind = ?node.kind, "node created");
        self.nodes.insert(id, node);
        self.roots.push(id);
        id
    }

    /// Create a node directly under `parent`.
    pub fn create_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        kind: NodeKind,
    ) -> Result<NodeId, SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        let id = self.create_node(name, kind);
        self.attach(id, parent)?;
        Ok(id)
    }

    /// Make `node` a child of `new_parent`, detaching it from its current
    /// parent (or the root list) first.
    ///
    /// Fails with [`SceneError::WouldCycle`] if `new_parent` is `node`
    /// itself or any of its descendants; the graph is unchanged on failure.
    pub fn attach(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(&node) {
            return Err(SceneError::NodeNotFound(node));
        }
        if !self.nodes.contains_key(&new_parent) {
            return Err(SceneError::NodeNotFound(new_parent));
        }
        // Walk up from the prospective parent; reaching `node` means the
        // parent sits inside the subtree being moved.
        let mut cursor = Some(new_parent);
        while let Some(current) = cursor {
            if current == node {
                return Err(SceneError::WouldCycle { node, new_parent });
            }
            cursor = self.nodes.get(&current).and_then(|n| n.parent);
        }

        self.detach(node);
        if let Some(parent) = self.nodes.get_mut(&new_parent) {
            parent.children.push(node);
        }
        if let Some(child) = self.nodes.get_mut(&node) {
            child.parent = Some(new_parent);
        }
        Ok(())
    }

    /// Same validation and semantics as [`attach`](Self::attach); named
    /// separately for call sites that move an already-parented subtree.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), SceneError> {
        self.attach(node, new_parent)
    }

    /// Remove `node` and its entire subtree, returning every freed id to
    /// the pool for reuse.
    pub fn destroy(&mut self, node: NodeId) -> Result<(), SceneError> {
        if !self.nodes.contains_key(&node) {
            return Err(SceneError::NodeNotFound(node));
        }
        self.detach(node);

        let mut stack = vec![node];
        let mut destroyed = 0usize;
        while let Some(id) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&id) {
                stack.extend(removed.children);
                self.pool.release(id);
                destroyed += 1;
            }
        }
        debug!(%node, destroyed, "subtree destroyed");
        Ok(())
    }

    /// Unlink `node` from its parent's child list or from the root list.
    fn detach(&mut self, node: NodeId) {
        let old_parent = self.nodes.get(&node).and_then(|n| n.parent);
        match old_parent {
            Some(parent_id) => {
                if let Some(parent) = self.nodes.get_mut(&parent_id) {
                    parent.children.retain(|&c| c != node);
                }
                if let Some(n) = self.nodes.get_mut(&node) {
                    n.parent = None;
                }
            }
            None => self.roots.retain(|&r| r != node),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Settle the whole forest for this frame.
    ///
    /// A depth-first walk with an explicit stack: on the way down each
    /// node composes its world transform from its parent's, runs its
    /// kind-specific update (terrain split/collapse), and re-derives its
    /// world-space volume from the fresh transform; on the way back up it
    /// folds its children's aggregate volumes into its own. After this
    /// returns every derived field is consistent, so culling never sees
    /// geometry from the previous frame.
    pub fn update(&mut self, dt: f64, camera: &CameraFrame) {
        let mut stack: Vec<(NodeId, Visit)> = self
            .roots
            .iter()
            .rev()
            .map(|&id| (id, Visit::Enter))
            .collect();

        while let Some((id, visit)) = stack.pop() {
            match visit {
                Visit::Enter => {
                    let parent_world = self
                        .nodes
                        .get(&id)
                        .and_then(|n| n.parent)
                        .and_then(|p| self.nodes.get(&p))
                        .map_or(DMat4::IDENTITY, |p| p.world_transform);
                    let Some(node) = self.nodes.get_mut(&id) else {
                        continue;
                    };
                    node.world_transform = parent_world * node.local_transform;
                    node.run_update(dt, camera);
                    node.refresh_world_volume();

                    stack.push((id, Visit::Exit));
                    for &child in node.children.iter().rev() {
                        stack.push((child, Visit::Enter));
                    }
                }
                Visit::Exit => {
                    let Some(node) = self.nodes.get(&id) else {
                        continue;
                    };
                    let mut aggregate = node.own_volume;
                    // Children were already finished by the time we unwind.
                    for child in node.children.clone() {
                        if let Some(child_node) = self.nodes.get(&child) {
                            aggregate = aggregate.union(&child_node.aggregate_volume);
                        }
                    }
                    if let Some(node) = self.nodes.get_mut(&id) {
                        node.aggregate_volume = aggregate;
                    }
                }
            }
        }
    }

    /// Walk the settled forest and let visible nodes append their commands.
    ///
    /// Each node's aggregate volume is tested against the frame's frustum;
    /// a miss prunes the entire subtree, which is sound because the
    /// aggregate encloses every descendant. Call between
    /// [`RenderQueues::begin_frame`] and [`RenderQueues::drain`].
    pub fn queue_render_commands(
        &mut self,
        frame: &FrameContext,
        queues: &mut RenderQueues,
        gfx: &mut dyn GraphicsContext,
    ) {
        let mut visited = 0usize;
        let mut pruned = 0usize;
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();

        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            visited += 1;
            if !node.aggregate_volume.intersects_frustum(&frame.frustum) {
                pruned += 1;
                continue;
            }
            node.queue_commands(&frame.frustum, &frame.camera, queues, gfx);
            for &child in node.children.iter().rev() {
                stack.push(child);
            }
        }

        trace!(
            frame = frame.index,
            visited,
            pruned,
            deferred = queues.deferred_len(),
            normal = queues.normal_len(),
            "render traversal complete"
        );
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DMat4, DVec3, Mat4};
    use tellus_math::{BoundingVolume, DSphere};
    use tellus_render::{
        BufferId, GeometryRef, MaterialId, PrimitiveTopology, RecordingContext, RenderCommand,
        StateOverrides,
    };
    use tellus_terrain::{TerrainParams, TerrainSurface};

    use crate::node::{Pass, PrimitiveNode};

    fn primitive(buffer: u32, pass: Pass, center: DVec3) -> NodeKind {
        NodeKind::Primitive(PrimitiveNode {
            command: RenderCommand {
                geometry: GeometryRef {
                    buffer: BufferId(buffer),
                    vertices: 0..6,
                },
                topology: PrimitiveTopology::TriangleList,
                material: MaterialId(0),
                transform: Mat4::IDENTITY,
                state: StateOverrides::default(),
            },
            pass,
            volume: BoundingVolume::Sphere(DSphere::new(center, 1.0)),
        })
    }

    /// Camera at (0, -10, 0) looking at the origin; sees the origin, does
    /// not see points behind the eye.
    fn origin_frame() -> FrameContext {
        let view = DMat4::look_at_rh(DVec3::new(0.0, -10.0, 0.0), DVec3::ZERO, DVec3::Z);
        let proj = DMat4::perspective_rh(1.2, 1.0, 0.1, 1000.0);
        FrameContext {
            index: 0,
            frustum: Frustum::from_view_projection(&(proj * view)),
            camera: camera(),
        }
    }

    fn camera() -> CameraFrame {
        CameraFrame::new(DVec3::new(0.0, -10.0, 0.0))
    }

    #[test]
    fn test_children_keep_creation_order() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root", NodeKind::Group);
        let a = graph.create_child(root, "a", NodeKind::Group).unwrap();
        let b = graph.create_child(root, "b", NodeKind::Group).unwrap();
        let c = graph.create_child(root, "c", NodeKind::Group).unwrap();
        assert_eq!(graph.node(root).unwrap().children(), &[a, b, c]);
        assert_eq!(graph.roots(), &[root]);
    }

    #[test]
    fn test_attach_moves_node_out_of_roots() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_node("parent", NodeKind::Group);
        let child = graph.create_node("child", NodeKind::Group);
        assert_eq!(graph.roots().len(), 2);

        graph.attach(child, parent).unwrap();
        assert_eq!(graph.roots(), &[parent]);
        assert_eq!(graph.node(child).unwrap().parent(), Some(parent));
    }

    #[test]
    fn test_reparent_rejects_cycle_and_leaves_graph_unmodified() {
        let mut graph = SceneGraph::new();
        let a = graph.create_node("a", NodeKind::Group);
        let b = graph.create_child(a, "b", NodeKind::Group).unwrap();
        let c = graph.create_child(b, "c", NodeKind::Group).unwrap();

        // Moving `a` under its own grandchild must fail before mutating.
        let err = graph.reparent(a, c).unwrap_err();
        assert_eq!(err, SceneError::WouldCycle { node: a, new_parent: c });
        assert_eq!(graph.roots(), &[a]);
        assert_eq!(graph.node(a).unwrap().parent(), None);
        assert_eq!(graph.node(a).unwrap().children(), &[b]);
        assert_eq!(graph.node(c).unwrap().children(), &[] as &[NodeId]);

        // Self-parenting is the degenerate cycle.
        assert!(matches!(
            graph.reparent(a, a),
            Err(SceneError::WouldCycle { .. })
        ));
    }

    #[test]
    fn test_reparent_moves_whole_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root", NodeKind::Group);
        let left = graph.create_child(root, "left", NodeKind::Group).unwrap();
        let right = graph.create_child(root, "right", NodeKind::Group).unwrap();
        let leaf = graph.create_child(left, "leaf", NodeKind::Group).unwrap();

        graph.reparent(left, right).unwrap();
        assert_eq!(graph.node(root).unwrap().children(), &[right]);
        assert_eq!(graph.node(right).unwrap().children(), &[left]);
        assert_eq!(graph.node(left).unwrap().children(), &[leaf]);
    }

    #[test]
    fn test_destroy_is_recursive_and_recycles_ids() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root", NodeKind::Group);
        let branch = graph.create_child(root, "branch", NodeKind::Group).unwrap();
        let leaf = graph.create_child(branch, "leaf", NodeKind::Group).unwrap();

        graph.destroy(branch).unwrap();
        assert_eq!(graph.len(), 1);
        assert!(graph.node(branch).is_none());
        assert!(graph.node(leaf).is_none());
        assert_eq!(graph.node(root).unwrap().children(), &[] as &[NodeId]);

        // The freed ids come back before any fresh one is minted.
        let recycled = graph.create_node("recycled", NodeKind::Group);
        assert!(recycled == branch || recycled == leaf);
    }

    #[test]
    fn test_destroy_unknown_node_errors() {
        let mut graph = SceneGraph::new();
        let id = graph.create_node("n", NodeKind::Group);
        graph.destroy(id).unwrap();
        assert_eq!(graph.destroy(id), Err(SceneError::NodeNotFound(id)));
    }

    #[test]
    fn test_update_composes_world_transforms_down_the_tree() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root", NodeKind::Group);
        let child = graph.create_child(root, "child", NodeKind::Group).unwrap();

        graph
            .node_mut(root)
            .unwrap()
            .set_local_transform(DMat4::from_translation(DVec3::new(10.0, 0.0, 0.0)));
        graph
            .node_mut(child)
            .unwrap()
            .set_local_transform(DMat4::from_translation(DVec3::new(0.0, 5.0, 0.0)));

        graph.update(1.0 / 60.0, &camera());

        let world = graph.node(child).unwrap().world_transform();
        let origin = world.transform_point3(DVec3::ZERO);
        assert!((origin - DVec3::new(10.0, 5.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_update_folds_descendant_volumes_into_aggregate() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root", NodeKind::Group);
        let far = DVec3::new(500.0, 0.0, 0.0);
        graph
            .create_child(root, "far", primitive(1, Pass::Normal, far))
            .unwrap();

        graph.update(1.0 / 60.0, &camera());

        let aggregate = graph.node(root).unwrap().aggregate_volume();
        assert!(
            aggregate.contains_point(far),
            "aggregate must enclose the child's geometry"
        );
        assert!(aggregate.contains_point(DVec3::ZERO));
    }

    #[test]
    fn test_visible_primitives_land_in_their_pass_queues() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root", NodeKind::Group);
        graph
            .create_child(root, "sky", primitive(1, Pass::Deferred, DVec3::ZERO))
            .unwrap();
        graph
            .create_child(root, "ground", primitive(2, Pass::Normal, DVec3::ZERO))
            .unwrap();

        let mut queues = RenderQueues::new();
        let mut gfx = RecordingContext::new();
        graph.update(1.0 / 60.0, &camera());
        queues.begin_frame();
        graph.queue_render_commands(&origin_frame(), &mut queues, &mut gfx);

        assert_eq!(queues.deferred_len(), 1);
        assert_eq!(queues.normal_len(), 1);
    }

    #[test]
    fn test_culled_subtree_contributes_nothing() {
        let mut graph = SceneGraph::new();
        // Entirely behind the camera at (0, -10, 0) looking toward +Y.
        let behind = DVec3::new(0.0, -100.0, 0.0);
        let root = graph.create_node("root", primitive(1, Pass::Normal, behind));
        graph
            .create_child(root, "child", primitive(2, Pass::Normal, behind))
            .unwrap();

        let mut queues = RenderQueues::new();
        let mut gfx = RecordingContext::new();
        graph.update(1.0 / 60.0, &camera());
        queues.begin_frame();
        graph.queue_render_commands(&origin_frame(), &mut queues, &mut gfx);

        assert!(queues.is_empty(), "culled nodes must enqueue nothing");
    }

    #[test]
    fn test_translated_primitive_is_culled_by_its_world_volume() {
        // Local volume at the origin, node translated far behind the
        // camera: culling must follow the transform, not the local bounds.
        let mut graph = SceneGraph::new();
        let node = graph.create_node("moved", primitive(1, Pass::Normal, DVec3::ZERO));
        graph
            .node_mut(node)
            .unwrap()
            .set_local_transform(DMat4::from_translation(DVec3::new(0.0, -1000.0, 0.0)));

        let mut queues = RenderQueues::new();
        let mut gfx = RecordingContext::new();
        graph.update(1.0 / 60.0, &camera());
        queues.begin_frame();
        graph.queue_render_commands(&origin_frame(), &mut queues, &mut gfx);

        assert!(
            queues.is_empty(),
            "a primitive moved out of view must not enqueue"
        );

        // Moving it back in front makes it visible again.
        graph
            .node_mut(node)
            .unwrap()
            .set_local_transform(DMat4::from_translation(DVec3::new(0.0, 2.0, 0.0)));
        graph.update(1.0 / 60.0, &camera());
        queues.begin_frame();
        graph.queue_render_commands(&origin_frame(), &mut queues, &mut gfx);
        assert_eq!(queues.normal_len(), 1);
    }

    #[test]
    fn test_primitive_command_transform_is_camera_relative() {
        // Camera and node both at planetary magnitude, 10 m apart: the
        // narrowed command translation must be the small relative offset.
        let eye = DVec3::new(6_371_000.0, 0.0, 0.0);
        let world = DVec3::new(6_371_010.0, 0.0, 0.0);

        let mut graph = SceneGraph::new();
        let node = graph.create_node("nearby", primitive(1, Pass::Normal, DVec3::ZERO));
        graph
            .node_mut(node)
            .unwrap()
            .set_local_transform(DMat4::from_translation(world));

        let camera = CameraFrame::new(eye);
        let view = DMat4::look_to_rh(eye, DVec3::X, DVec3::Z);
        let proj = DMat4::perspective_rh(1.2, 1.0, 0.1, 1000.0);
        let frame = FrameContext {
            index: 0,
            frustum: Frustum::from_view_projection(&(proj * view)),
            camera: camera.clone(),
        };

        let mut queues = RenderQueues::new();
        let mut gfx = RecordingContext::new();
        graph.update(1.0 / 60.0, &camera);
        queues.begin_frame();
        graph.queue_render_commands(&frame, &mut queues, &mut gfx);
        queues.drain(&mut gfx);

        let command = gfx.submitted().next().expect("one command submitted");
        let translation = command.transform.w_axis.truncate();
        assert!(
            (translation.x - 10.0).abs() < 1e-3,
            "translation must be camera-relative, got {translation}"
        );
        assert!(translation.y.abs() < 1e-3 && translation.z.abs() < 1e-3);
    }

    #[test]
    fn test_group_visibility_follows_children() {
        // A group's own volume is a point at the origin, but its aggregate
        // grows to cover its children, so a child sitting in view keeps the
        // traversal from pruning at the group.
        let mut graph = SceneGraph::new();
        let group = graph.create_node("group", NodeKind::Group);
        graph
            .node_mut(group)
            .unwrap()
            .set_local_volume(BoundingVolume::point(DVec3::new(0.0, -100.0, 0.0)));
        graph
            .create_child(group, "visible", primitive(1, Pass::Normal, DVec3::ZERO))
            .unwrap();

        let mut queues = RenderQueues::new();
        let mut gfx = RecordingContext::new();
        graph.update(1.0 / 60.0, &camera());
        queues.begin_frame();
        graph.queue_render_commands(&origin_frame(), &mut queues, &mut gfx);

        assert_eq!(queues.normal_len(), 1);
    }

    #[test]
    fn test_frame_counts_do_not_accumulate_across_frames() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root", NodeKind::Group);
        graph
            .create_child(root, "p", primitive(1, Pass::Normal, DVec3::ZERO))
            .unwrap();

        let mut queues = RenderQueues::new();
        let mut gfx = RecordingContext::new();
        let frame = origin_frame();

        for index in 0..3 {
            graph.update(1.0 / 60.0, &camera());
            queues.begin_frame();
            assert!(queues.is_empty(), "queues must start each frame empty");
            graph.queue_render_commands(
                &FrameContext { index, ..frame.clone() },
                &mut queues,
                &mut gfx,
            );
            assert_eq!(queues.normal_len(), 1, "same scene, same command count");
            queues.drain(&mut gfx);
        }
    }

    #[test]
    fn test_terrain_node_updates_and_queues_through_the_graph() {
        const RADIUS: f64 = 6_371_000.0;
        let mut graph = SceneGraph::new();
        let planet = graph.create_node(
            "planet",
            NodeKind::Terrain(TerrainSurface::hemispheres(
                TerrainParams::new(RADIUS, 1.2, 8),
                BufferId(3),
                MaterialId(1),
            )),
        );

        let eye = DVec3::new(0.0, -(RADIUS * 1.15), 0.0);
        let camera = CameraFrame::new(eye);
        let view = DMat4::look_at_rh(eye, DVec3::ZERO, DVec3::Z);
        let proj = DMat4::perspective_rh(1.2, 1.0, 1.0, 100.0 * RADIUS);
        let frame = FrameContext {
            index: 0,
            frustum: Frustum::from_view_projection(&(proj * view)),
            camera: camera.clone(),
        };

        let mut queues = RenderQueues::new();
        let mut gfx = RecordingContext::new();
        graph.update(1.0 / 60.0, &camera);
        queues.begin_frame();
        graph.queue_render_commands(&frame, &mut queues, &mut gfx);

        assert_eq!(queues.normal_len(), 1, "terrain contributes one command");
        let NodeKind::Terrain(surface) = graph.node(planet).unwrap().kind() else {
            panic!("planet node must stay a terrain node");
        };
        assert!(
            surface.roots()[0].is_split(),
            "camera altitude must trigger a split through the graph update"
        );
    }
}
