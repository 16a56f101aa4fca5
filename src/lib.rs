#![doc = include_str!("../README.md")]

pub mod coordinator;
pub mod graph;
pub mod potential;
pub mod resolution;
pub mod util;

#[doc(inline)]
pub use codec::{GraphArchive, GraphInfo, Segment, SegmentId, Serializer};
#[doc(inline)]
pub use graph::{Crossing, GraphError, Route, SegmentGraph};
#[doc(inline)]
pub use resolution::{
    BacktrackingAvoidResolution, Collision, CollisionResolution, Resolution, ResolveError,
};
