use codec::{CodecError, SegmentId};
use roadmap_geo::GeoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("segment {0} does not exist")]
    UnknownSegment(SegmentId),

    #[error("segment {0} already exists")]
    DuplicateSegment(SegmentId),

    #[error("end of {from} does not meet the start of {to}")]
    Disconnected { from: SegmentId, to: SegmentId },

    #[error("{from} links to missing segment {to}")]
    DanglingLink { from: SegmentId, to: SegmentId },

    #[error("{from} lists {to} as successor, but not the reverse")]
    AsymmetricLink { from: SegmentId, to: SegmentId },

    #[error("a crossing needs at least one point")]
    EmptyCrossing,

    #[error("invalid segment: {0}")]
    Segment(#[from] CodecError),

    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeoError),
}
