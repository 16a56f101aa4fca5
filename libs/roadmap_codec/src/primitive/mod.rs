use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub mod segment;

pub use segment::Segment;

/// Identifier of a [`Segment`] within one roadmap generation.
///
/// Identifiers are minted by the owning graph and never reused.
#[derive(
    Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SegmentId(pub u32);

impl SegmentId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The identifier immediately after this one.
    #[inline]
    pub const fn succ(self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for SegmentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for SegmentId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
