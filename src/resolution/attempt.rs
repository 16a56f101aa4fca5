use crate::graph::SegmentGraph;

use codec::{Segment, SegmentId};
use indexmap::{IndexMap, IndexSet};
use log::debug;
use rustc_hash::FxBuildHasher;

/// Bookkeeping for a single resolution attempt.
///
/// Tracks which segments backtracking has visited, which detours were
/// created and a copy of every pre-existing segment taken before it was
/// first touched. Together these are enough to undo the attempt.
#[derive(Debug, Clone, Default)]
pub struct ResolutionAttempt {
    avoided: IndexSet<SegmentId, FxBuildHasher>,
    created: Vec<SegmentId>,
    snapshots: IndexMap<SegmentId, Segment, FxBuildHasher>,
}

impl ResolutionAttempt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Segments visited while backtracking, in visiting order.
    pub fn avoided(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.avoided.iter().copied()
    }

    /// Detours created by this attempt, in creation order.
    pub fn created(&self) -> &[SegmentId] {
        &self.created
    }

    /// Pre-existing segments this attempt has modified.
    pub fn touched(&self) -> impl Iterator<Item = SegmentId> + '_ {
        self.snapshots.keys().copied()
    }

    pub fn is_avoided(&self, id: SegmentId) -> bool {
        self.avoided.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.avoided.is_empty() && self.created.is_empty() && self.snapshots.is_empty()
    }

    /// Marks a segment as visited. Returns `false` if it already was.
    pub(crate) fn avoid(&mut self, id: SegmentId) -> bool {
        self.avoided.insert(id)
    }

    pub(crate) fn record(&mut self, id: SegmentId) {
        self.created.push(id);
    }

    /// Copies a segment before its first modification. Detours of this
    /// attempt are removed wholesale on rollback, so they are never copied.
    pub(crate) fn snapshot(&mut self, graph: &SegmentGraph, id: SegmentId) {
        if self.created.contains(&id) || self.snapshots.contains_key(&id) {
            return;
        }

        if let Some(segment) = graph.segment(id) {
            self.snapshots.insert(id, segment.clone());
        }
    }

    /// Forgets the bookkeeping, leaving the graph as it is.
    pub fn reset(&mut self) {
        self.avoided.clear();
        self.created.clear();
        self.snapshots.clear();
    }

    /// Undoes every mutation of the attempt, then forgets the bookkeeping.
    pub fn rollback(&mut self, graph: &mut SegmentGraph) {
        for id in self.created.iter().rev() {
            graph.remove(*id);
        }

        for (_, segment) in self.snapshots.drain(..) {
            graph.restore(segment);
        }

        debug!(
            "Rolled back {} detours, {} segments avoided",
            self.created.len(),
            self.avoided.len()
        );

        self.reset();
    }
}
