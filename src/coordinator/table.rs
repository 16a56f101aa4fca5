use crate::coordinator::{Occupancy, PathCoordinator, RobotId, RouteEntry, TimeWindow};
use crate::resolution::{Collision, Resolution};

use codec::SegmentId;
use indexmap::IndexMap;
use log::debug;
use rustc_hash::FxBuildHasher;
use std::ops::RangeInclusive;

/// Where a robot's route first conflicts with another robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionReport {
    /// Position of the conflicting entry within the robot's route.
    pub index: usize,
    pub segment: SegmentId,
    /// The other robot's claim on the segment.
    pub other: Occupancy,
}

/// In-memory [`PathCoordinator`] keeping one route per robot.
///
/// Robots are queried in the order they were first given a route, so
/// occupancy answers are deterministic.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: IndexMap<RobotId, Vec<RouteEntry>, FxBuildHasher>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns (or replaces) the route of `robot`.
    pub fn set_route(&mut self, robot: RobotId, entries: impl IntoIterator<Item = RouteEntry>) {
        self.routes.insert(robot, entries.into_iter().collect());
    }

    pub fn route(&self, robot: RobotId) -> Option<&[RouteEntry]> {
        self.routes.get(&robot).map(Vec::as_slice)
    }

    /// The earliest entry of `robot`'s route claimed by another robot within
    /// `overlap` steps of its own window.
    pub fn first_collision(&self, robot: RobotId, overlap: u32) -> Option<CollisionReport> {
        self.route(robot)?
            .iter()
            .enumerate()
            .find_map(|(index, entry)| {
                self.query_occupancy(entry.segment, entry.window.widen(overlap), robot)
                    .map(|other| CollisionReport {
                        index,
                        segment: entry.segment,
                        other,
                    })
            })
    }

    /// Turns the first collision of `robot` into the input of a resolver.
    ///
    /// A conflict on the very first entry has no segment to detour from,
    /// so it yields nothing. The offset is the number of steps between the
    /// robot entering the segment and the other robot's claim beginning.
    /// Every entry before `current` becomes the collision's upstream route.
    pub fn collision(&self, robot: RobotId, overlap: u32) -> Option<Collision> {
        let report = self.first_collision(robot, overlap)?;
        if report.index == 0 {
            return None;
        }

        let route = self.route(robot)?;
        let (current, own, end) = (
            route[report.index - 1],
            route[report.index],
            route.last()?,
        );

        let offset = report.other.window.start.saturating_sub(own.window.start);
        Some(
            Collision::new(current.segment, own.segment, end.segment, offset)
                .with_robot(robot, own.window)
                .with_upstream(route[..report.index - 1].iter().map(|entry| entry.segment)),
        )
    }

    /// Replaces the entries `range` of `robot`'s route by `segments`.
    ///
    /// The new entries receive consecutive windows of `step` steps starting
    /// where the replaced range started; every later entry is shifted by the
    /// difference in duration. Returns `false` if the robot or range is unknown.
    pub fn splice(
        &mut self,
        robot: RobotId,
        range: RangeInclusive<usize>,
        segments: &[SegmentId],
        step: u32,
    ) -> bool {
        let Some(route) = self.routes.get_mut(&robot) else {
            return false;
        };

        let (from, to) = (*range.start(), *range.end());
        if from > to || to >= route.len() {
            return false;
        }

        let step = step.max(1);
        let begin = route[from].window.start;
        let old_end = route[to].window.end;

        let entries = segments
            .iter()
            .zip(0u32..)
            .map(|(segment, k)| {
                let start = begin.saturating_add(k.saturating_mul(step));
                RouteEntry::new(
                    *segment,
                    TimeWindow::new(start, start.saturating_add(step - 1)),
                )
            })
            .collect::<Vec<_>>();

        let new_end = entries
            .last()
            .map_or(begin.saturating_sub(1), |entry| entry.window.end);

        for entry in route.iter_mut().skip(to + 1) {
            let shift = |t: u32| {
                if new_end >= old_end {
                    t.saturating_add(new_end - old_end)
                } else {
                    t.saturating_sub(old_end - new_end)
                }
            };

            entry.window = TimeWindow::new(shift(entry.window.start), shift(entry.window.end));
        }

        debug!(
            "Spliced {} segments into the route of {robot} at {from}..={to}",
            segments.len()
        );

        route.splice(from..=to, entries);
        true
    }

    /// Splices a resolution of `robot`'s collision into its route, replacing
    /// everything from the first replaced position to the route end.
    ///
    /// Returns `false` for an unresolvable outcome, or when the resolution
    /// does not fit the route.
    pub fn apply(&mut self, robot: RobotId, resolution: &Resolution, step: u32) -> bool {
        let (Some(from), Some(segments)) = (resolution.replaced_from(), resolution.segments())
        else {
            return false;
        };

        let Some(last) = self.route(robot).and_then(|route| route.len().checked_sub(1)) else {
            return false;
        };

        self.splice(robot, from..=last, segments, step)
    }
}

impl PathCoordinator for RouteTable {
    fn query_occupancy(
        &self,
        segment: SegmentId,
        window: TimeWindow,
        exclude: RobotId,
    ) -> Option<Occupancy> {
        self.routes
            .iter()
            .filter(|(robot, _)| **robot != exclude)
            .find_map(|(robot, entries)| {
                entries
                    .iter()
                    .find(|entry| entry.segment == segment && entry.window.overlaps(&window, 0))
                    .map(|entry| Occupancy {
                        robot: *robot,
                        segment,
                        window: entry.window,
                    })
            })
    }
}
