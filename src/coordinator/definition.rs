use codec::SegmentId;
use std::fmt::{Display, Formatter};

/// Identifies a robot taking part in the plan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RobotId(pub u32);

impl Display for RobotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "R{}", self.0)
    }
}

/// A closed interval `[start, end]` of discrete planning steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeWindow {
    pub start: u32,
    pub end: u32,
}

impl TimeWindow {
    /// Creates a window, ordering the bounds if given in reverse.
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Grows the window by `margin` steps on each side.
    pub fn widen(self, margin: u32) -> Self {
        Self {
            start: self.start.saturating_sub(margin),
            end: self.end.saturating_add(margin),
        }
    }

    /// Whether the two windows intersect once this one is widened by `margin`.
    pub fn overlaps(&self, other: &TimeWindow, margin: u32) -> bool {
        let widened = self.widen(margin);
        widened.start <= other.end && other.start <= widened.end
    }

    /// Number of steps covered by the window.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start).saturating_add(1)
    }
}

/// One step of a robot's route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub segment: SegmentId,
    pub window: TimeWindow,
}

impl RouteEntry {
    pub fn new(segment: SegmentId, window: TimeWindow) -> Self {
        Self { segment, window }
    }
}

/// A robot holding a segment during a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occupancy {
    pub robot: RobotId,
    pub segment: SegmentId,
    pub window: TimeWindow,
}

/// Answers occupancy queries against every robot's planned route.
///
/// ### Note
/// Implementations are only read during a resolution, so they are shared
/// behind an `Arc` and must be `Send + Sync` to live inside a resolver.
pub trait PathCoordinator {
    /// Returns the first robot other than `exclude` whose route holds
    /// `segment` at some point during `window`.
    fn query_occupancy(
        &self,
        segment: SegmentId,
        window: TimeWindow,
        exclude: RobotId,
    ) -> Option<Occupancy>;
}
