//! GPU-facing vertex layout for terrain surface patches.

use bytemuck::{Pod, Zeroable};

/// One corner of a terrain patch quad.
///
/// Positions are geodetic (longitude, latitude) in radians; the vertex
/// shader projects them onto the sphere using the camera's high/low pair.
/// Texture coordinates are the unit corner of the patch.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SurfaceVertex {
    /// Longitude and latitude in radians.
    pub position: [f32; 2],
    /// Unit texture coordinate for this corner.
    pub uv: [f32; 2],
}

impl SurfaceVertex {
    /// Create a vertex from geodetic radians and a unit UV corner.
    pub fn new(lon: f32, lat: f32, u: f32, v: f32) -> Self {
        Self {
            position: [lon, lat],
            uv: [u, v],
        }
    }
}
