use crate::coordinator::{RobotId, TimeWindow};
use crate::graph::SegmentGraph;
use crate::resolution::{ResolutionAttempt, ResolveError};

use codec::SegmentId;

/// A detected conflict on a robot's route.
///
/// The robot is on `current` and about to enter `next`, which is claimed by
/// another robot. `end` is the last segment of the route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub current: SegmentId,
    pub next: SegmentId,
    pub end: SegmentId,

    /// Steps between the robot entering `next` and the conflicting claim
    /// beginning. Zero means the conflict starts as the robot enters.
    pub offset: u32,

    /// The resolving robot and its window on `next`. Without it, upstream
    /// segments are never considered occupied while backtracking.
    pub robot: Option<(RobotId, TimeWindow)>,

    /// The route driven before `current`, in order. Backtracking only walks
    /// along it, and treats `current` as the route start when it is empty.
    pub upstream: Vec<SegmentId>,
}

impl Collision {
    pub fn new(current: SegmentId, next: SegmentId, end: SegmentId, offset: u32) -> Self {
        Self {
            current,
            next,
            end,
            offset,
            robot: None,
            upstream: Vec::new(),
        }
    }

    pub fn with_robot(self, robot: RobotId, window: TimeWindow) -> Self {
        Self {
            robot: Some((robot, window)),
            ..self
        }
    }

    pub fn with_upstream(self, upstream: impl IntoIterator<Item = SegmentId>) -> Self {
        Self {
            upstream: upstream.into_iter().collect(),
            ..self
        }
    }

    /// Position of `current` within the robot's route.
    pub fn position(&self) -> usize {
        self.upstream.len()
    }
}

/// The outcome of a resolution which did not break the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The segments replacing the route from position `from` to its end.
    ///
    /// Positions count from the start of the route, so `current` sits at
    /// [`Collision::position`]. A local detour starts there, a backtracked one
    /// earlier, and a detour of the route start at `0`.
    Resolved { from: usize, segments: Vec<SegmentId> },

    /// No detour fits, even after backtracking to the route start.
    /// The caller is expected to reorder collisions or re-route.
    Unresolvable,
}

impl Resolution {
    pub fn segments(&self) -> Option<&[SegmentId]> {
        match self {
            Resolution::Resolved { segments, .. } => Some(segments),
            Resolution::Unresolvable => None,
        }
    }

    /// Route position of the first replaced entry.
    pub fn replaced_from(&self) -> Option<usize> {
        match self {
            Resolution::Resolved { from, .. } => Some(*from),
            Resolution::Unresolvable => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved { .. })
    }
}

/// A strategy removing a collision from a robot's route.
///
/// ### Note
/// Resolutions mutate the graph: detours are inserted and neighbouring
/// segments re-linked. Every mutation is recorded in the
/// [`ResolutionAttempt`] so that [`CollisionResolution::clear`] can undo it.
pub trait CollisionResolution {
    /// Resolves the collision for a robot of `robot_radius`.
    ///
    /// Starts a fresh attempt, forgetting (but keeping) whatever an
    /// earlier call created. Invalid input is rejected before anything is
    /// mutated, and a graph inconsistency rolls the attempt back before the
    /// error is returned.
    fn resolve(
        &mut self,
        graph: &mut SegmentGraph,
        collision: &Collision,
        robot_radius: f64,
    ) -> Result<Resolution, ResolveError>;

    /// Forgets the bookkeeping, committing every mutation made so far.
    fn reset(&mut self);

    /// Removes every detour of the current attempt from the graph, restores
    /// the segments it touched and forgets the bookkeeping.
    fn clear(&mut self, graph: &mut SegmentGraph);

    /// The bookkeeping of the current attempt.
    fn attempt(&self) -> &ResolutionAttempt;
}
