//! Segment primitives shared by the roadmap, and the on-disk archive
//! used to reuse a built roadmap when the underlying map is unchanged.

pub mod archive;
pub mod error;
pub mod primitive;

pub use archive::{GraphArchive, GraphInfo, Serializer};
pub use error::CodecError;
pub use primitive::Segment;
pub use primitive::SegmentId;
