//! Time-indexed occupancy of the roadmap.
//!
//! Every robot holds a route: the segments it will traverse, each paired
//! with the [`TimeWindow`] in which it occupies it. The coordinator answers
//! whether another robot holds a segment during some window, and is the
//! source of the [`Collision`](crate::resolution::Collision) a resolver acts on.

pub mod definition;
pub mod table;

#[doc(inline)]
pub use definition::*;
#[doc(inline)]
pub use table::*;
