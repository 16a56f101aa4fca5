use crate::{CodecError, SegmentId};

use geo::{Coord, LineString};
use roadmap_geo::Polyline;
use smallvec::SmallVec;

/// Neighbouring segment identifiers. Most junctions join few segments.
pub type Links = SmallVec<[SegmentId; 4]>;

/// An edge of the roadmap: a drivable polyline between two junctions.
///
/// The first point of [`Segment::path`] is where the segment connects to its
/// predecessors, the last point is where it connects to its successors.
/// A robot whose radius exceeds [`Segment::min_path_space`] cannot use it.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    id: SegmentId,
    predecessors: Links,
    successors: Links,
    path: LineString<f64>,
    min_path_space: f64,
}

impl Segment {
    /// Creates an unlinked segment.
    ///
    /// Fails if the path is empty or the clearance is negative.
    pub fn new(
        id: SegmentId,
        path: LineString<f64>,
        min_path_space: f64,
    ) -> Result<Self, CodecError> {
        if path.0.is_empty() {
            return Err(CodecError::Inconsistent(format!("segment {id} has no points")));
        }

        if min_path_space.is_nan() || min_path_space < 0.0 {
            return Err(CodecError::Inconsistent(format!(
                "segment {id} has invalid clearance {min_path_space}"
            )));
        }

        Ok(Self {
            id,
            predecessors: Links::new(),
            successors: Links::new(),
            path,
            min_path_space,
        })
    }

    /// Consumes the segment, replacing its links.
    pub fn with_links(
        self,
        predecessors: impl IntoIterator<Item = SegmentId>,
        successors: impl IntoIterator<Item = SegmentId>,
    ) -> Self {
        Self {
            predecessors: predecessors.into_iter().collect(),
            successors: successors.into_iter().collect(),
            ..self
        }
    }

    #[inline]
    pub fn id(&self) -> SegmentId {
        self.id
    }

    #[inline]
    pub fn predecessors(&self) -> &[SegmentId] {
        &self.predecessors
    }

    #[inline]
    pub fn successors(&self) -> &[SegmentId] {
        &self.successors
    }

    #[inline]
    pub fn path(&self) -> &LineString<f64> {
        &self.path
    }

    #[inline]
    pub fn min_path_space(&self) -> f64 {
        self.min_path_space
    }

    /// Connection point toward the predecessors.
    #[inline]
    pub fn start(&self) -> Coord {
        self.path.head().unwrap_or_else(|_| Coord::zero())
    }

    /// Connection point toward the successors.
    #[inline]
    pub fn end(&self) -> Coord {
        self.path.tail().unwrap_or_else(|_| Coord::zero())
    }

    pub fn length(&self) -> f64 {
        self.path.arc_length()
    }

    /// Whether a robot of the given radius fits along the whole segment.
    #[inline]
    pub fn admits(&self, radius: f64) -> bool {
        radius <= self.min_path_space
    }

    pub fn is_start(&self) -> bool {
        self.predecessors.is_empty()
    }

    pub fn is_end(&self) -> bool {
        self.successors.is_empty()
    }

    pub fn add_predecessor(&mut self, id: SegmentId) {
        if !self.predecessors.contains(&id) {
            self.predecessors.push(id);
        }
    }

    pub fn add_successor(&mut self, id: SegmentId) {
        if !self.successors.contains(&id) {
            self.successors.push(id);
        }
    }

    /// Drops every link (in either direction) to `id`.
    pub fn unlink(&mut self, id: SegmentId) {
        self.predecessors.retain(|p| *p != id);
        self.successors.retain(|s| *s != id);
    }

    /// Replaces the polyline. An empty path is rejected and leaves the
    /// segment untouched.
    pub fn set_path(&mut self, path: LineString<f64>) -> Result<(), CodecError> {
        if path.0.is_empty() {
            return Err(CodecError::Inconsistent(format!(
                "segment {} cannot take an empty path",
                self.id
            )));
        }

        self.path = path;
        Ok(())
    }
}
