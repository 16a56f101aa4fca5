use crate::graph::GraphError;

use codec::{Segment, SegmentId};
use geo::LineString;
use indexmap::IndexMap;
use log::debug;
use petgraph::prelude::DiGraphMap;
use roadmap_geo::{Polyline, coincident};
use rustc_hash::FxBuildHasher;

use std::fmt::{Debug, Formatter};

/// Directed view over the successor links, weighted by the length of the
/// segment being entered.
pub type Topology = DiGraphMap<SegmentId, f64>;

type Arena = IndexMap<SegmentId, Segment, FxBuildHasher>;

/// The roadmap: an arena of [`Segment`]s keyed by their identifier.
///
/// All references between segments are identifiers looked up in the arena.
/// Iteration follows insertion order, so every traversal is deterministic.
///
/// ### Invariant
/// Connectivity is positional. Whenever `b` is a successor of `a`, the last
/// point of `a` coincides with the first point of `b` (see [`coincident`]).
/// Mutations that would break this are rejected.
#[derive(Clone, Default)]
pub struct SegmentGraph {
    segments: Arena,
    next_id: SegmentId,
}

impl Debug for SegmentGraph {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SegmentGraph with Segments: {}", self.segments.len())
    }
}

impl SegmentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from already-linked segments, validating every link.
    pub fn from_segments(segments: impl IntoIterator<Item = Segment>) -> Result<Self, GraphError> {
        let mut graph = Self::new();
        for segment in segments {
            graph.insert(segment)?;
        }

        graph.validate()?;
        Ok(graph)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn contains(&self, id: SegmentId) -> bool {
        self.segments.contains_key(&id)
    }

    #[inline]
    pub fn segment(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(&id)
    }

    /// Like [`SegmentGraph::segment`], but a missing segment is an error.
    #[inline]
    pub fn get(&self, id: SegmentId) -> Result<&Segment, GraphError> {
        self.segments.get(&id).ok_or(GraphError::UnknownSegment(id))
    }

    pub fn predecessors(&self, id: SegmentId) -> Result<&[SegmentId], GraphError> {
        self.get(id).map(Segment::predecessors)
    }

    pub fn successors(&self, id: SegmentId) -> Result<&[SegmentId], GraphError> {
        self.get(id).map(Segment::successors)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.segments.keys().copied()
    }

    /// The identifier the next [`SegmentGraph::mint_id`] call will return.
    pub fn peek_id(&self) -> SegmentId {
        self.next_id
    }

    /// Reserves a fresh identifier. Identifiers are never handed out twice,
    /// even if the segment they were minted for is removed again.
    pub fn mint_id(&mut self) -> SegmentId {
        let id = self.next_id;
        self.next_id = id.succ();
        id
    }

    /// Adds a segment as-is, keeping whatever links it carries.
    pub fn insert(&mut self, segment: Segment) -> Result<SegmentId, GraphError> {
        let id = segment.id();
        if self.segments.contains_key(&id) {
            return Err(GraphError::DuplicateSegment(id));
        }

        if id >= self.next_id {
            self.next_id = id.succ();
        }

        self.segments.insert(id, segment);
        Ok(id)
    }

    /// Removes a segment along with every link pointing at it.
    pub fn remove(&mut self, id: SegmentId) -> Option<Segment> {
        let removed = self.segments.shift_remove(&id)?;

        removed
            .predecessors()
            .iter()
            .chain(removed.successors())
            .for_each(|neighbour| {
                if let Some(segment) = self.segments.get_mut(neighbour) {
                    segment.unlink(id);
                }
            });

        debug!("Removed segment {id}");
        Some(removed)
    }

    /// Overwrites a segment with an earlier copy of itself.
    ///
    /// Links are restored verbatim; this is only meant to undo mutations
    /// that were recorded beforehand.
    pub(crate) fn restore(&mut self, segment: Segment) {
        self.segments.insert(segment.id(), segment);
    }

    pub(crate) fn segment_mut(&mut self, id: SegmentId) -> Result<&mut Segment, GraphError> {
        self.segments
            .get_mut(&id)
            .ok_or(GraphError::UnknownSegment(id))
    }

    /// Checks that the end of `from` meets the start of `to`.
    pub fn check_junction(&self, from: SegmentId, to: SegmentId) -> Result<(), GraphError> {
        let (a, b) = (self.get(from)?, self.get(to)?);
        if !coincident(a.end(), b.start()) {
            return Err(GraphError::Disconnected { from, to });
        }

        Ok(())
    }

    /// Makes `to` a successor of `from`.
    pub fn link(&mut self, from: SegmentId, to: SegmentId) -> Result<(), GraphError> {
        self.check_junction(from, to)?;

        self.segment_mut(from)?.add_successor(to);
        self.segment_mut(to)?.add_predecessor(from);
        Ok(())
    }

    /// Replaces the polyline of a segment in place.
    ///
    /// The new path must still meet every predecessor at its first point and
    /// every successor at its last point, otherwise nothing changes.
    pub fn replace_path(&mut self, id: SegmentId, path: LineString<f64>) -> Result<(), GraphError> {
        let (head, tail) = (path.head()?, path.tail()?);
        let segment = self.get(id)?;

        for pred in segment.predecessors() {
            if !coincident(self.get(*pred)?.end(), head) {
                return Err(GraphError::Disconnected {
                    from: *pred,
                    to: id,
                });
            }
        }

        for succ in segment.successors() {
            if !coincident(tail, self.get(*succ)?.start()) {
                return Err(GraphError::Disconnected {
                    from: id,
                    to: *succ,
                });
            }
        }

        self.segment_mut(id)?.set_path(path)?;
        Ok(())
    }

    /// Verifies every link: both ends exist, they agree on the direction
    /// and the polylines meet.
    pub fn validate(&self) -> Result<(), GraphError> {
        for segment in self.iter() {
            let from = segment.id();
            for to in segment.successors() {
                let next = self.segment(*to).ok_or(GraphError::DanglingLink { from, to: *to })?;
                if !next.predecessors().contains(&from) {
                    return Err(GraphError::AsymmetricLink { from, to: *to });
                }

                self.check_junction(from, *to)?;
            }

            for to in segment.predecessors() {
                let prev = self.segment(*to).ok_or(GraphError::DanglingLink { from, to: *to })?;
                if !prev.successors().contains(&from) {
                    return Err(GraphError::AsymmetricLink { from: *to, to: from });
                }
            }
        }

        Ok(())
    }

    /// Directed graph of successor links, weighted by the length of the
    /// entered segment.
    pub fn topology(&self) -> Topology {
        let mut topology = Topology::new();
        for segment in self.iter() {
            topology.add_node(segment.id());
        }

        for segment in self.iter() {
            for succ in segment.successors() {
                if let Some(next) = self.segment(*succ) {
                    topology.add_edge(segment.id(), *succ, next.length());
                }
            }
        }

        topology
    }
}
