//! Adaptive quadtree terrain LOD for a spherical planet.
//!
//! Each [`TerrainQuadNode`] covers one lat/lon patch of the surface at one
//! level of detail and decides every frame, from the camera position alone,
//! whether to subdivide or coalesce. Subdivision is driven by an inflated
//! "split box" around each patch: strictly larger than the patch's tight
//! bounds, so a camera sitting exactly on a boundary cannot oscillate
//! between split and collapse across frames.
//!
//! Children are allocated lazily on first split and never freed; a collapse
//! only clears the `is_split` flag. The bounded maximum depth keeps the
//! total node count finite, and in practice only the column of patches
//! under the camera is ever subdivided.

mod node;
mod scheme;
mod surface;

pub use node::{MAX_DEPTH, QuadCorners, Quadrant, TerrainQuadNode};
pub use scheme::{SubdivisionScheme, TerrainParams};
pub use surface::{MAX_LEAVES_PER_FRAME, TerrainSurface};
