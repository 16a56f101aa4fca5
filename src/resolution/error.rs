use crate::graph::GraphError;

use codec::SegmentId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("segment {0} does not exist")]
    UnknownSegment(SegmentId),

    #[error("{next} is not a successor of {current}")]
    NotSuccessor { current: SegmentId, next: SegmentId },

    #[error("{end} cannot be reached from {next}")]
    Unreachable { next: SegmentId, end: SegmentId },

    #[error("robot radius must be finite and non-negative, got {0}")]
    InvalidRadius(f64),

    #[error("graph became inconsistent, attempt was rolled back: {0}")]
    Inconsistent(#[from] GraphError),
}
