//! The roadmap as an arena of segments.

pub mod crossing;
pub mod error;
mod impls;
pub mod item;
pub(crate) mod traits;

#[doc(inline)]
pub use crossing::Crossing;
#[doc(inline)]
pub use error::GraphError;
#[doc(inline)]
pub use item::{SegmentGraph, Topology};
pub use traits::*;
