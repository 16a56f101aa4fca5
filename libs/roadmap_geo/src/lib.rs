//! Planar geometry used by the roadmap.
//!
//! Roadmap coordinates are metric map coordinates (not lat/lng), so every
//! measure here is plain euclidean.

/// Two endpoints closer than this are considered the same junction.
pub const CONNECTION_TOLERANCE: f64 = 1e-3;

#[doc(hidden)]
pub mod error;
pub mod offset;
pub mod polyline;

#[doc(inline)]
pub use error::GeoError;
#[doc(inline)]
pub use offset::{LateralOffset, Side};
#[doc(inline)]
pub use polyline::Polyline;

/// Whether two coordinates describe the same connection point.
#[inline]
pub fn coincident(a: geo::Coord, b: geo::Coord) -> bool {
    let (dx, dy) = (a.x - b.x, a.y - b.y);
    (dx * dx + dy * dy).sqrt() <= CONNECTION_TOLERANCE
}
