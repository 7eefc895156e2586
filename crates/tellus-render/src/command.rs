//! Immutable draw-call records.

use std::ops::Range;

use glam::Mat4;

/// Identifies a vertex buffer owned by the graphics context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Identifies a shading/resource binding set owned by the graphics context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MaterialId(pub u32);

/// Primitive layout of the geometry referenced by a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
    TriangleStrip,
    LineList,
    /// Consecutive groups of four vertices, one surface patch each. The
    /// device expands patches into triangles (shared index pattern or
    /// tessellation); the core only supplies the corners.
    QuadPatchList,
}

/// Blend state override for a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BlendMode {
    #[default]
    Opaque,
    Alpha,
    Additive,
}

/// Raster/blend/depth state overrides carried by a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateOverrides {
    pub depth_test: bool,
    pub depth_write: bool,
    pub blend: BlendMode,
}

impl Default for StateOverrides {
    fn default() -> Self {
        Self {
            depth_test: true,
            depth_write: true,
            blend: BlendMode::Opaque,
        }
    }
}

/// A range of vertices within a context-owned buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeometryRef {
    pub buffer: BufferId,
    pub vertices: Range<u32>,
}

/// An immutable record of one draw operation.
///
/// Commands are built during scene traversal and moved into a queue; queue
/// order determines submission order within a pass. A command never
/// survives the frame it was enqueued in.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderCommand {
    /// Geometry to draw.
    pub geometry: GeometryRef,
    /// How the vertices are assembled.
    pub topology: PrimitiveTopology,
    /// Shading/resource bindings to use.
    pub material: MaterialId,
    /// Object-to-camera-relative transform, already narrowed to f32.
    pub transform: Mat4,
    /// Pipeline state overrides.
    pub state: StateOverrides,
}

impl RenderCommand {
    /// Number of vertices this command draws.
    pub fn vertex_count(&self) -> u32 {
        self.geometry.vertices.end - self.geometry.vertices.start
    }
}
