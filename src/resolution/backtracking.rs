use crate::coordinator::PathCoordinator;
use crate::graph::{GraphError, Route, SegmentGraph};
use crate::potential::PotentialCalculator;
use crate::resolution::*;

use codec::{Segment, SegmentId};
use geo::LineString;
use log::{debug, info, warn};
use roadmap_geo::{LateralOffset, Side, coincident};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use strum::IntoEnumIterator;

#[cfg(feature = "tracing")]
use tracing::Level;

/// How the lateral displacement is laid over the segment being replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// Both ends stay on the original junctions.
    Pinned,
    /// The first point moves with the displacement.
    FreeStart,
    /// Bulge in the first half, ends pinned.
    Early,
    /// Bulge in the second half, ends pinned.
    Late,
}

impl Shape {
    fn offset(self, distance: f64, side: Side, ramp: f64) -> LateralOffset {
        let offset = LateralOffset::new(distance, side);
        match self {
            Shape::Pinned => offset.with_ramp(ramp),
            Shape::FreeStart => offset.with_ramp(ramp).free_start(),
            Shape::Early => offset.with_span(ramp, 0.5),
            Shape::Late => offset.with_span(0.5, 1.0 - ramp),
        }
    }
}

/// A feasible detour geometry, not yet part of the graph.
#[derive(Debug, Clone)]
struct Placement {
    path: LineString<f64>,
    side: Side,
    min_path_space: f64,
    potential: f64,
}

/// Resolves collisions by offsetting a detour sideways, and backtracking
/// along the robot's route when the corridor is too narrow to do so.
///
/// A detour replaces a segment by a laterally displaced copy of it. The
/// displacement is the spare clearance `min_path_space - robot_radius`, so
/// the robot keeps exactly its radius of room on the detour. When the spare
/// clearance is below [`AvoidConfig::min_lateral_offset`], the segment
/// driven before it is offset instead, then the one before that, until the
/// route start ([`Collision::upstream`] exhausted) is reached.
///
/// ### Example
/// ```rust
/// use std::sync::Arc;
/// use geo::line_string;
/// use roadmap_router::coordinator::RouteTable;
/// use roadmap_router::graph::SegmentGraph;
/// use roadmap_router::potential::FlatPotential;
/// use roadmap_router::resolution::*;
/// use roadmap_router::SegmentId;
///
/// let mut graph = SegmentGraph::from_polylines(
///     [
///         (line_string![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0)], 0.6),
///         (line_string![(x: 4.0, y: 0.0), (x: 8.0, y: 0.0)], 0.5),
///         (line_string![(x: 8.0, y: 0.0), (x: 12.0, y: 0.0)], 0.6),
///     ],
///     0.01,
/// )?;
///
/// let mut resolver = BacktrackingAvoidResolution::new(
///     Arc::new(RouteTable::new()),
///     Arc::new(FlatPotential),
///     0,
/// );
///
/// let collision = Collision::new(SegmentId(0), SegmentId(1), SegmentId(2), 0);
/// let resolution = resolver.resolve(&mut graph, &collision, 0.3)?;
/// assert_eq!(resolution.segments().map(<[_]>::len), Some(3));
/// assert_eq!(resolution.replaced_from(), Some(0));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct BacktrackingAvoidResolution {
    coordinator: Arc<dyn PathCoordinator + Send + Sync>,
    potential: Arc<dyn PotentialCalculator + Send + Sync>,

    /// Margin, in steps, by which occupancy windows are widened when
    /// checking whether an upstream segment is free.
    time_overlap: u32,
    config: AvoidConfig,
    attempt: ResolutionAttempt,
}

impl Debug for BacktrackingAvoidResolution {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BacktrackingAvoidResolution with Segments: {}",
            self.attempt.created().len()
        )
    }
}

impl BacktrackingAvoidResolution {
    pub fn new(
        coordinator: Arc<dyn PathCoordinator + Send + Sync>,
        potential: Arc<dyn PotentialCalculator + Send + Sync>,
        time_overlap: u32,
    ) -> Self {
        Self {
            coordinator,
            potential,
            time_overlap,
            config: AvoidConfig::default(),
            attempt: ResolutionAttempt::new(),
        }
    }

    pub fn with_config(self, config: AvoidConfig) -> Self {
        Self { config, ..self }
    }

    pub fn config(&self) -> &AvoidConfig {
        &self.config
    }

    pub fn time_overlap(&self) -> u32 {
        self.time_overlap
    }

    fn validate(
        graph: &SegmentGraph,
        collision: &Collision,
        robot_radius: f64,
    ) -> Result<Vec<SegmentId>, ResolveError> {
        if !robot_radius.is_finite() || robot_radius < 0.0 {
            return Err(ResolveError::InvalidRadius(robot_radius));
        }

        let (current, next, end) = (collision.current, collision.next, collision.end);

        for id in [current, next, end] {
            if !graph.contains(id) {
                return Err(ResolveError::UnknownSegment(id));
            }
        }

        // The driven route up to `next` must be connected
        let driven = collision
            .upstream
            .iter()
            .copied()
            .chain([current, next])
            .collect::<Vec<_>>();

        for pair in driven.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let segment = graph
                .segment(from)
                .ok_or(ResolveError::UnknownSegment(from))?;

            if !segment.successors().contains(&to) {
                return Err(ResolveError::NotSuccessor {
                    current: from,
                    next: to,
                });
            }
        }

        if next == end {
            return Ok(vec![next]);
        }

        graph
            .route(next, end)
            .map(|(_, tail)| tail)
            .ok_or(ResolveError::Unreachable { next, end })
    }
}

impl CollisionResolution for BacktrackingAvoidResolution {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, level = Level::INFO))]
    fn resolve(
        &mut self,
        graph: &mut SegmentGraph,
        collision: &Collision,
        robot_radius: f64,
    ) -> Result<Resolution, ResolveError> {
        self.attempt.reset();
        let tail = Self::validate(graph, collision, robot_radius)?;

        let new_potential = graph
            .segment(collision.next)
            .map_or(0.0, |segment| self.potential.potential(segment.path()));

        debug!(
            "Resolving {} -> {} (end {}, offset {}, {} upstream) for radius {robot_radius}, potential {new_potential}",
            collision.current,
            collision.next,
            collision.end,
            collision.offset,
            collision.upstream.len()
        );

        let outcome = Backtrack {
            graph: &mut *graph,
            attempt: &mut self.attempt,
            coordinator: self.coordinator.as_ref(),
            potential: self.potential.as_ref(),
            config: &self.config,
            time_overlap: self.time_overlap,
            collision,
            radius: robot_radius,
        }
        .run(&tail);

        match outcome {
            Ok(Resolution::Unresolvable) => {
                warn!(
                    "No detour fits between {} and {} for radius {robot_radius}",
                    collision.current, collision.next
                );
                Ok(Resolution::Unresolvable)
            }
            Ok(resolution) => {
                info!(
                    "Resolved {} -> {} with {} detours from route position {:?}: {:?}",
                    collision.current,
                    collision.next,
                    self.attempt.created().len(),
                    resolution.replaced_from(),
                    resolution.segments()
                );
                Ok(resolution)
            }
            Err(err) => {
                warn!("Rolling back after inconsistency: {err}");
                self.attempt.rollback(graph);
                Err(ResolveError::Inconsistent(err))
            }
        }
    }

    fn reset(&mut self) {
        self.attempt.reset();
    }

    fn clear(&mut self, graph: &mut SegmentGraph) {
        self.attempt.rollback(graph);
    }

    fn attempt(&self) -> &ResolutionAttempt {
        &self.attempt
    }
}

/// The state threaded through one resolution.
struct Backtrack<'a> {
    graph: &'a mut SegmentGraph,
    attempt: &'a mut ResolutionAttempt,
    coordinator: &'a (dyn PathCoordinator + Send + Sync),
    potential: &'a (dyn PotentialCalculator + Send + Sync),
    config: &'a AvoidConfig,
    time_overlap: u32,
    collision: &'a Collision,
    radius: f64,
}

type Outcome = Result<Option<Vec<SegmentId>>, GraphError>;

impl Backtrack<'_> {
    /// `tail` is the route from `next` to `end`, both inclusive.
    fn run(mut self, tail: &[SegmentId]) -> Result<Resolution, GraphError> {
        let collision = self.collision;
        let (current, next) = (collision.current, collision.next);
        let cross_next = tail.get(1).copied();

        let resolved = match self.avoid(current, next, cross_next)? {
            Some(segments) => Some(segments),
            None => self.track_back(&collision.upstream, current, next)?,
        };

        let Some(mut segments) = resolved else {
            return Ok(Resolution::Unresolvable);
        };

        // Every sequence ends in place of `next`, one past `current`
        let from = (collision.position() + 2).saturating_sub(segments.len());
        segments.extend(tail.iter().skip(1));

        Ok(Resolution::Resolved { from, segments })
    }

    /// Replaces `next` by a detour from the end of `current` to the start of
    /// `cross_next`. Without `cross_next`, `next` ends the route.
    fn avoid(
        &mut self,
        current: SegmentId,
        next: SegmentId,
        cross_next: Option<SegmentId>,
    ) -> Outcome {
        if cross_next.is_none() {
            return self.avoid_end(current, next);
        }

        let Some(placement) = self.place(next, Shape::Pinned)? else {
            return Ok(None);
        };

        let detour = self.move_segment(Some(current), next, placement, cross_next)?;
        Ok(Some(vec![current, detour]))
    }

    /// Replaces the final segment by a detour which still terminates at the
    /// destination. The collision offset places the bulge: a conflict
    /// beginning as the robot enters is dodged early, otherwise late.
    fn avoid_end(&mut self, current: SegmentId, end: SegmentId) -> Outcome {
        let shape = match self.collision.offset {
            0 => Shape::Early,
            _ => Shape::Late,
        };

        let Some(placement) = self.place(end, shape)? else {
            return Ok(None);
        };

        let detour = self.move_segment(Some(current), end, placement, None)?;
        Ok(Some(vec![current, detour]))
    }

    /// Replaces the first segment of the route, moving its start point too.
    fn avoid_start(&mut self, current: SegmentId, next: SegmentId) -> Outcome {
        let Some(placement) = self.place(current, Shape::FreeStart)? else {
            return Ok(None);
        };

        let detour = self.move_segment(None, current, placement, Some(next))?;
        Ok(Some(vec![detour, next]))
    }

    /// Opens space upstream of `next` by offsetting `current` from the
    /// segment driven before it, recursing further up the route when that is
    /// too narrow. `upstream` is the part of the route driven before `current`.
    fn track_back(
        &mut self,
        upstream: &[SegmentId],
        current: SegmentId,
        next: SegmentId,
    ) -> Outcome {
        if !self.attempt.avoid(current) {
            debug!("Already backtracked through {current}");
            return Ok(None);
        }

        let Some((&prev, upstream)) = upstream.split_last() else {
            debug!("Reached route start at {current}");
            return self.avoid_start(current, next);
        };

        if self.attempt.is_avoided(prev) || self.is_occupied(prev) {
            debug!("Cannot backtrack from {current} through {prev}");
            return Ok(None);
        }

        if let Some(mut segments) = self.avoid(prev, current, Some(next))? {
            segments.push(next);
            return Ok(Some(segments));
        }

        Ok(self
            .track_back(upstream, prev, current)?
            .map(|mut segments| {
                segments.push(next);
                segments
            }))
    }

    fn is_occupied(&self, segment: SegmentId) -> bool {
        let Some((robot, window)) = self.collision.robot else {
            return false;
        };

        self.coordinator
            .query_occupancy(segment, window.widen(self.time_overlap), robot)
            .is_some()
    }

    /// Finds the best lateral displacement of `original`, if any side fits.
    ///
    /// Both sides are offset by the spare clearance. A side is infeasible
    /// when its geometry cannot be built or its potential is infinite or
    /// exceeds that of `original` by more than the budget. The lower
    /// potential wins, and left wins a tie.
    fn place(&self, original: SegmentId, shape: Shape) -> Result<Option<Placement>, GraphError> {
        let segment = self.graph.get(original)?;
        let distance = segment.min_path_space() - self.radius;

        if distance.is_nan() || distance < self.config.min_lateral_offset {
            debug!(
                "Corridor of {original} too narrow: {:.3} spare for radius {}",
                distance, self.radius
            );
            return Ok(None);
        }

        let ceiling = self.potential.potential(segment.path()) + self.config.potential_budget;
        let placement = Side::iter()
            .filter_map(|side| {
                let path = shape
                    .offset(distance, side, self.config.ramp_fraction)
                    .apply(segment.path())
                    .inspect_err(|err| debug!("Cannot offset {original} to the {side}: {err}"))
                    .ok()?;

                let potential = self.potential.potential(&path);
                if !potential.is_finite() || potential > ceiling {
                    debug!("Offsetting {original} to the {side} is blocked ({potential})");
                    return None;
                }

                Some(Placement {
                    path,
                    side,
                    min_path_space: (segment.min_path_space() - distance).max(self.radius),
                    potential,
                })
            })
            .min_by(|a, b| a.potential.total_cmp(&b.potential));

        if let Some(placement) = &placement {
            debug!(
                "Offsetting {original} by {distance:.3} to the {} ({:?} shape)",
                placement.side, shape
            );
        }

        Ok(placement)
    }

    /// Commits a detour replacing `original`: inserts it under a fresh id,
    /// links it after `prev`, snaps its last point onto `cross_next` (or the
    /// end of `original`) and links it before `cross_next`.
    fn move_segment(
        &mut self,
        prev: Option<SegmentId>,
        original: SegmentId,
        placement: Placement,
        cross_next: Option<SegmentId>,
    ) -> Result<SegmentId, GraphError> {
        let id = self.graph.mint_id();
        let destination = self.graph.get(original)?.end();

        self.graph.insert(Segment::new(
            id,
            placement.path,
            placement.min_path_space,
        )?)?;
        self.attempt.record(id);

        if let Some(prev) = prev {
            self.attempt.snapshot(&*self.graph, prev);
            self.graph.link(prev, id)?;
        }

        let target = match cross_next {
            Some(next) => {
                self.attempt.snapshot(&*self.graph, next);
                self.graph.get(next)?.start()
            }
            None => destination,
        };

        let mut path = self.graph.get(id)?.path().clone();
        match path.0.last_mut() {
            Some(last) if coincident(*last, target) => *last = target,
            _ => {
                return Err(GraphError::Disconnected {
                    from: id,
                    to: cross_next.unwrap_or(original),
                });
            }
        }

        self.graph.replace_path(id, path)?;
        if let Some(next) = cross_next {
            self.graph.link(id, next)?;
        }

        debug!("Detour {id} replaces {original}");
        Ok(id)
    }
}
