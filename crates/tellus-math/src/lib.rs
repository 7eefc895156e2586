//! Double-precision bounding volumes, intersection tests, and geodetic coordinates.
//!
//! Everything here works in f64. Planet-scale positions (~6.4e6 m) lose
//! sub-meter accuracy in f32, so culling and containment decisions are made
//! in double precision and values are narrowed to f32 only at the render
//! boundary (see `tellus-coords`).

mod aabb;
mod frustum;
mod geodetic;
mod sphere;
mod volume;

pub use aabb::DAabb;
pub use frustum::Frustum;
pub use geodetic::Geodetic;
pub use sphere::DSphere;
pub use volume::BoundingVolume;
