use crate::coordinator::*;
use crate::graph::traits::util::corridor;
use crate::graph::{GraphError, SegmentGraph};
use crate::potential::{FlatPotential, ObstaclePotential, PotentialCalculator};
use crate::resolution::*;

use approx::assert_relative_eq;
use codec::{Segment, SegmentId};
use geo::{LineString, coord, line_string};
use std::collections::HashMap;
use std::sync::Arc;

const RADIUS: f64 = 0.3;

fn resolver() -> BacktrackingAvoidResolution {
    resolver_with(FlatPotential)
}

fn resolver_with(
    potential: impl PotentialCalculator + Send + Sync + 'static,
) -> BacktrackingAvoidResolution {
    BacktrackingAvoidResolution::new(Arc::new(RouteTable::new()), Arc::new(potential), 0)
}

fn ids(ids: &[u32]) -> Vec<SegmentId> {
    ids.iter().copied().map(SegmentId).collect()
}

fn resolved(resolution: Resolution) -> Vec<SegmentId> {
    match resolution {
        Resolution::Resolved { segments, .. } => segments,
        Resolution::Unresolvable => panic!("expected a resolution"),
    }
}

/// Consecutive segments meet, and every detour leaves room for the robot.
fn assert_drivable(graph: &SegmentGraph, segments: &[SegmentId], created: &[SegmentId]) {
    for pair in segments.windows(2) {
        graph
            .check_junction(pair[0], pair[1])
            .unwrap_or_else(|err| panic!("{} -> {} broken: {err}", pair[0], pair[1]));
    }

    for id in created {
        let detour = graph.segment(*id).expect("detour is in the graph");
        assert!(detour.min_path_space() >= RADIUS, "{id} too narrow");
    }

    graph.validate().expect("graph stays consistent");
}

fn max_lateral(path: &LineString<f64>) -> f64 {
    path.coords().map(|c| c.y).fold(0.0, |acc, y| if y.abs() > acc.abs() { y } else { acc })
}

#[test_log::test]
fn offsets_the_conflicting_segment() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = corridor(&[0.6, 0.5, 0.6])?;
    let mut resolver = resolver();

    let collision = Collision::new(SegmentId(0), SegmentId(1), SegmentId(2), 0);
    let resolution = resolver.resolve(&mut graph, &collision, RADIUS)?;
    assert_eq!(resolution.replaced_from(), Some(collision.position()));

    let segments = resolved(resolution);
    assert_eq!(segments, ids(&[0, 3, 2]));
    assert_eq!(resolver.attempt().created(), &ids(&[3])[..]);
    assert_drivable(&graph, &segments, resolver.attempt().created());

    let detour = graph.get(SegmentId(3))?;
    assert_eq!(detour.start(), graph.get(SegmentId(0))?.end());
    assert_eq!(detour.end(), graph.get(SegmentId(2))?.start());
    assert_relative_eq!(detour.min_path_space(), RADIUS, epsilon = 1e-9);

    // Spare clearance of 0.2, to the left of travel along +x
    assert_relative_eq!(max_lateral(detour.path()), 0.2, epsilon = 1e-9);

    // The original stays in place, the detour is an alternative branch
    assert!(graph.contains(SegmentId(1)));
    assert_eq!(graph.successors(SegmentId(0))?, &ids(&[1, 3])[..]);
    Ok(())
}

#[test_log::test]
fn shifts_the_route_start_when_too_narrow() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = corridor(&[0.6, 0.25, 0.6])?;
    let mut resolver = resolver();

    let collision = Collision::new(SegmentId(0), SegmentId(1), SegmentId(2), 0);
    let segments = resolved(resolver.resolve(&mut graph, &collision, RADIUS)?);

    assert_eq!(segments, ids(&[3, 1, 2]));
    assert_drivable(&graph, &segments, resolver.attempt().created());

    let detour = graph.get(SegmentId(3))?;
    assert!(detour.predecessors().is_empty());
    assert_eq!(detour.end(), coord! { x: 4.0, y: 0.0 });
    assert_relative_eq!(detour.start().y, 0.3, epsilon = 1e-9);

    let attempt = resolver.attempt();
    assert_eq!(attempt.avoided().collect::<Vec<_>>(), ids(&[0]));
    assert_eq!(attempt.touched().collect::<Vec<_>>(), ids(&[1]));
    Ok(())
}

#[test_log::test]
fn backtracks_to_an_earlier_segment() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = corridor(&[0.6, 0.6, 0.25, 0.6])?;
    let mut resolver = resolver();

    let collision = Collision::new(SegmentId(1), SegmentId(2), SegmentId(3), 0)
        .with_upstream([SegmentId(0)]);
    let resolution = resolver.resolve(&mut graph, &collision, RADIUS)?;
    assert_eq!(resolution.replaced_from(), Some(0));

    // Segment 1 is replaced, from the end of 0 into the narrow segment 2
    let segments = resolved(resolution);
    assert_eq!(segments, ids(&[0, 4, 2, 3]));
    assert_drivable(&graph, &segments, resolver.attempt().created());
    assert_eq!(resolver.attempt().avoided().collect::<Vec<_>>(), ids(&[1]));
    Ok(())
}

#[test_log::test]
fn detour_to_the_end_keeps_the_destination() -> Result<(), Box<dyn std::error::Error>> {
    for (offset, early) in [(0, true), (3, false)] {
        let mut graph = corridor(&[0.6, 0.5])?;
        let destination = graph.get(SegmentId(1))?.end();
        let mut resolver = resolver();

        let collision = Collision::new(SegmentId(0), SegmentId(1), SegmentId(1), offset);
        let segments = resolved(resolver.resolve(&mut graph, &collision, RADIUS)?);

        assert_eq!(segments, ids(&[0, 2]));
        assert_drivable(&graph, &segments, resolver.attempt().created());

        let detour = graph.get(SegmentId(2))?;
        assert_eq!(detour.end(), destination);
        assert!(detour.successors().is_empty());

        // Where the full displacement is held, relative to the midpoint (6, 0)
        let bulge = detour
            .path()
            .coords()
            .filter(|c| c.y > 0.19)
            .map(|c| c.x)
            .collect::<Vec<_>>();

        assert!(!bulge.is_empty());
        match early {
            true => assert!(bulge.iter().all(|x| *x <= 6.0 + 1e-9), "{bulge:?}"),
            false => assert!(bulge.iter().all(|x| *x >= 6.0 - 1e-9), "{bulge:?}"),
        }
    }

    Ok(())
}

#[test_log::test]
fn unresolvable_when_nothing_fits() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = corridor(&[0.3, 0.3, 0.3])?;
    let before = graph.len();
    let mut resolver = resolver();

    let collision = Collision::new(SegmentId(0), SegmentId(1), SegmentId(2), 0);
    let resolution = resolver.resolve(&mut graph, &collision, RADIUS)?;

    assert_eq!(resolution, Resolution::Unresolvable);
    assert!(resolution.segments().is_none());
    assert_eq!(graph.len(), before);
    assert!(resolver.attempt().created().is_empty());
    assert_eq!(resolver.attempt().avoided().collect::<Vec<_>>(), ids(&[0]));
    Ok(())
}

#[test_log::test]
fn route_start_is_the_first_driven_segment() -> Result<(), Box<dyn std::error::Error>> {
    // Segment 0 leads into the route, but the robot starts on 1
    let mut graph = corridor(&[0.6, 0.6, 0.25, 0.6])?;

    let mut table = RouteTable::new();
    table.set_route(
        RobotId(0),
        [
            RouteEntry::new(SegmentId(1), TimeWindow::new(0, 4)),
            RouteEntry::new(SegmentId(2), TimeWindow::new(5, 9)),
            RouteEntry::new(SegmentId(3), TimeWindow::new(10, 14)),
        ],
    );
    table.set_route(
        RobotId(1),
        [RouteEntry::new(SegmentId(2), TimeWindow::new(5, 9))],
    );

    let collision = table.collision(RobotId(0), 0).expect("routes cross");
    assert!(collision.upstream.is_empty());

    let mut resolver =
        BacktrackingAvoidResolution::new(Arc::new(table.clone()), Arc::new(FlatPotential), 0);
    let resolution = resolver.resolve(&mut graph, &collision, RADIUS)?;
    assert_eq!(resolution.replaced_from(), Some(0));

    let segments = resolved(resolution.clone());
    assert_eq!(segments, ids(&[4, 2, 3]));
    assert_drivable(&graph, &segments, resolver.attempt().created());

    // The start of segment 1 moved, and nothing upstream was touched
    let detour = graph.get(SegmentId(4))?;
    assert!(detour.predecessors().is_empty());
    assert_relative_eq!(detour.start().y, 0.3, epsilon = 1e-9);
    assert_eq!(graph.successors(SegmentId(0))?, &ids(&[1])[..]);
    assert_eq!(resolver.attempt().avoided().collect::<Vec<_>>(), ids(&[1]));

    assert!(table.apply(RobotId(0), &resolution, 5));
    let route = table
        .route(RobotId(0))
        .expect("robot 0 has a route")
        .iter()
        .map(|entry| entry.segment)
        .collect::<Vec<_>>();
    assert_eq!(route, segments);
    Ok(())
}

#[test_log::test]
fn backtracking_follows_the_driven_branch() -> Result<(), Box<dyn std::error::Error>> {
    // Segments 0 and 1 both feed 2, which leads into the narrow 3
    let mut graph = SegmentGraph::new();
    for (id, path, space) in [
        (0, line_string![(x: -4.0, y: 0.0), (x: 0.0, y: 0.0)], 0.6),
        (1, line_string![(x: 0.0, y: -4.0), (x: 0.0, y: 0.0)], 0.6),
        (2, line_string![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0)], 0.6),
        (3, line_string![(x: 4.0, y: 0.0), (x: 8.0, y: 0.0)], 0.25),
        (4, line_string![(x: 8.0, y: 0.0), (x: 12.0, y: 0.0)], 0.6),
    ] {
        graph.insert(Segment::new(SegmentId(id), path, space)?)?;
    }

    for (from, to) in [(0, 2), (1, 2), (2, 3), (3, 4)] {
        graph.link(SegmentId(from), SegmentId(to))?;
    }
    assert_eq!(graph.predecessors(SegmentId(2))?, &ids(&[0, 1])[..]);

    // The robot arrives from the second predecessor
    let collision = Collision::new(SegmentId(2), SegmentId(3), SegmentId(4), 0)
        .with_upstream([SegmentId(1)]);

    let mut resolver = resolver();
    let resolution = resolver.resolve(&mut graph, &collision, RADIUS)?;
    assert_eq!(resolution.replaced_from(), Some(0));

    let segments = resolved(resolution);
    assert_eq!(segments, ids(&[1, 5, 3, 4]));
    assert_drivable(&graph, &segments, resolver.attempt().created());

    assert_eq!(graph.predecessors(SegmentId(5))?, &ids(&[1])[..]);
    assert_eq!(graph.successors(SegmentId(0))?, &ids(&[2])[..]);
    assert_eq!(resolver.attempt().touched().collect::<Vec<_>>(), ids(&[1, 3]));
    Ok(())
}

#[test_log::test]
fn backtracked_resolution_splices_into_the_route() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = corridor(&[0.6, 0.6, 0.25, 0.6])?;

    let mut table = RouteTable::new();
    table.set_route(
        RobotId(0),
        [
            RouteEntry::new(SegmentId(0), TimeWindow::new(0, 4)),
            RouteEntry::new(SegmentId(1), TimeWindow::new(5, 9)),
            RouteEntry::new(SegmentId(2), TimeWindow::new(10, 14)),
            RouteEntry::new(SegmentId(3), TimeWindow::new(15, 19)),
        ],
    );
    table.set_route(
        RobotId(1),
        [RouteEntry::new(SegmentId(2), TimeWindow::new(8, 16))],
    );

    let collision = table.collision(RobotId(0), 0).expect("routes cross");
    assert_eq!(collision.upstream, ids(&[0]));
    assert_eq!(collision.position(), 1);

    let mut resolver =
        BacktrackingAvoidResolution::new(Arc::new(table.clone()), Arc::new(FlatPotential), 0);
    let resolution = resolver.resolve(&mut graph, &collision, RADIUS)?;
    assert_eq!(resolution.replaced_from(), Some(0));

    assert!(table.apply(RobotId(0), &resolution, 5));
    let route = table.route(RobotId(0)).expect("robot 0 has a route");
    assert_eq!(
        route.iter().map(|entry| entry.segment).collect::<Vec<_>>(),
        ids(&[0, 4, 2, 3])
    );
    assert_eq!(route[3].window, TimeWindow::new(15, 19));

    for pair in route.windows(2) {
        graph.check_junction(pair[0].segment, pair[1].segment)?;
    }

    // Nothing to splice for an unresolvable outcome
    assert!(!table.apply(RobotId(0), &Resolution::Unresolvable, 5));
    Ok(())
}

#[test_log::test]
fn backtracking_terminates_on_looping_routes() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = SegmentGraph::from_polylines(
        [
            (line_string![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0)], 0.3),
            (line_string![(x: 4.0, y: 0.0), (x: 4.0, y: 4.0)], 0.3),
            (line_string![(x: 4.0, y: 4.0), (x: 0.0, y: 4.0)], 0.3),
            (line_string![(x: 0.0, y: 4.0), (x: 0.0, y: 0.0)], 0.3),
        ],
        0.01,
    )?;
    assert_eq!(graph.predecessors(SegmentId(0))?, &ids(&[3])[..]);

    // A full lap was driven before reaching segment 0 again
    let mut resolver = resolver();
    let collision = Collision::new(SegmentId(0), SegmentId(1), SegmentId(2), 0)
        .with_upstream(ids(&[3, 0, 1, 2, 3]));

    assert_eq!(
        resolver.resolve(&mut graph, &collision, RADIUS)?,
        Resolution::Unresolvable
    );
    assert_eq!(
        resolver.attempt().avoided().collect::<Vec<_>>(),
        ids(&[0, 3, 2, 1])
    );
    Ok(())
}

#[test_log::test]
fn resolving_again_after_reset_is_deterministic() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = corridor(&[0.6, 0.5, 0.6])?;
    let mut resolver = resolver();
    let collision = Collision::new(SegmentId(0), SegmentId(1), SegmentId(2), 0);

    let first = resolved(resolver.resolve(&mut graph, &collision, RADIUS)?);
    let first_path = graph.get(first[1])?.path().clone();

    resolver.reset();
    assert!(resolver.attempt().is_empty());

    let second = resolved(resolver.resolve(&mut graph, &collision, RADIUS)?);
    assert_eq!(first.len(), second.len());
    assert_ne!(first[1], second[1], "detours receive fresh ids");
    assert_eq!(graph.get(second[1])?.path(), &first_path);

    // Both detours were committed
    assert!(graph.contains(first[1]) && graph.contains(second[1]));
    Ok(())
}

#[test_log::test]
fn clear_rolls_the_attempt_back() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = corridor(&[0.6, 0.25, 0.6])?;
    let pristine = graph.iter().cloned().collect::<Vec<Segment>>();
    let mut resolver = resolver();

    let collision = Collision::new(SegmentId(0), SegmentId(1), SegmentId(2), 0);
    let segments = resolved(resolver.resolve(&mut graph, &collision, RADIUS)?);
    assert_eq!(graph.predecessors(SegmentId(1))?, &ids(&[0, 3])[..]);

    resolver.clear(&mut graph);

    assert!(!graph.contains(segments[0]));
    assert!(resolver.attempt().is_empty());
    assert_eq!(graph.iter().cloned().collect::<Vec<_>>(), pristine);
    graph.validate()?;

    // Ids are not handed out again
    assert_eq!(graph.peek_id(), SegmentId(4));
    Ok(())
}

#[test_log::test]
fn inconsistency_is_rolled_back() -> Result<(), Box<dyn std::error::Error>> {
    // Segment 2 is linked to 1, yet starts half a metre past its end
    let mut graph = SegmentGraph::new();
    graph.insert(
        Segment::new(SegmentId(0), line_string![(x: 0.0, y: 0.0), (x: 4.0, y: 0.0)], 0.6)?
            .with_links([], [SegmentId(1)]),
    )?;
    graph.insert(
        Segment::new(SegmentId(1), line_string![(x: 4.0, y: 0.0), (x: 8.0, y: 0.0)], 0.5)?
            .with_links([SegmentId(0)], [SegmentId(2)]),
    )?;
    graph.insert(
        Segment::new(SegmentId(2), line_string![(x: 8.5, y: 0.0), (x: 12.0, y: 0.0)], 0.6)?
            .with_links([SegmentId(1)], []),
    )?;

    let mut resolver = resolver();
    let collision = Collision::new(SegmentId(0), SegmentId(1), SegmentId(2), 0);

    let result = resolver.resolve(&mut graph, &collision, RADIUS);
    assert!(matches!(
        result,
        Err(ResolveError::Inconsistent(GraphError::Disconnected {
            from: SegmentId(3),
            to: SegmentId(2)
        }))
    ));

    assert!(!graph.contains(SegmentId(3)));
    assert_eq!(graph.successors(SegmentId(0))?, &ids(&[1])[..]);
    assert!(resolver.attempt().is_empty());
    Ok(())
}

#[test]
fn invalid_input_is_rejected_untouched() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = corridor(&[0.6, 0.5, 0.6])?;
    let mut resolver = resolver();

    let valid = Collision::new(SegmentId(0), SegmentId(1), SegmentId(2), 0);
    assert!(matches!(
        resolver.resolve(&mut graph, &valid, f64::NAN),
        Err(ResolveError::InvalidRadius(_))
    ));
    assert!(matches!(
        resolver.resolve(&mut graph, &valid, -1.0),
        Err(ResolveError::InvalidRadius(_))
    ));

    let unknown = Collision::new(SegmentId(0), SegmentId(9), SegmentId(2), 0);
    assert!(matches!(
        resolver.resolve(&mut graph, &unknown, RADIUS),
        Err(ResolveError::UnknownSegment(SegmentId(9)))
    ));

    let skipping = Collision::new(SegmentId(0), SegmentId(2), SegmentId(2), 0);
    assert!(matches!(
        resolver.resolve(&mut graph, &skipping, RADIUS),
        Err(ResolveError::NotSuccessor { .. })
    ));

    let backwards = Collision::new(SegmentId(1), SegmentId(2), SegmentId(0), 0);
    assert!(matches!(
        resolver.resolve(&mut graph, &backwards, RADIUS),
        Err(ResolveError::Unreachable { .. })
    ));

    let unknown_upstream = valid.clone().with_upstream([SegmentId(7)]);
    assert!(matches!(
        resolver.resolve(&mut graph, &unknown_upstream, RADIUS),
        Err(ResolveError::UnknownSegment(SegmentId(7)))
    ));

    let broken_upstream = Collision::new(SegmentId(1), SegmentId(2), SegmentId(2), 0)
        .with_upstream([SegmentId(2)]);
    assert!(matches!(
        resolver.resolve(&mut graph, &broken_upstream, RADIUS),
        Err(ResolveError::NotSuccessor {
            current: SegmentId(2),
            next: SegmentId(1)
        })
    ));

    assert_eq!(graph.len(), 3);
    assert_eq!(graph.peek_id(), SegmentId(3));
    Ok(())
}

#[test]
fn ties_prefer_the_left() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = corridor(&[0.6, 0.5, 0.6])?;
    let collision = Collision::new(SegmentId(0), SegmentId(1), SegmentId(2), 0);

    let segments = resolved(resolver().resolve(&mut graph, &collision, RADIUS)?);
    assert!(max_lateral(graph.get(segments[1])?.path()) > 0.0);
    Ok(())
}

#[test]
fn lower_potential_side_wins() -> Result<(), Box<dyn std::error::Error>> {
    let collision = Collision::new(SegmentId(0), SegmentId(1), SegmentId(2), 0);

    // Penalise the left of travel directly
    let mut graph = corridor(&[0.6, 0.5, 0.6])?;
    let leftward = |path: &LineString<f64>| path.coords().map(|c| c.y).sum::<f64>();
    let segments = resolved(resolver_with(leftward).resolve(&mut graph, &collision, RADIUS)?);
    assert!(max_lateral(graph.get(segments[1])?.path()) < 0.0);

    // A wall above the corridor
    let mut graph = corridor(&[0.6, 0.5, 0.6])?;
    let wall = ObstaclePotential::new([coord! { x: 6.0, y: 1.0 }], 1.0, 0.1);
    let segments = resolved(resolver_with(wall).resolve(&mut graph, &collision, RADIUS)?);
    assert!(max_lateral(graph.get(segments[1])?.path()) < 0.0);
    Ok(())
}

#[test]
fn potential_budget_limits_detours() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = corridor(&[0.6, 0.5, 0.6])?;
    let displacement = |path: &LineString<f64>| path.coords().map(|c| c.y.abs()).sum::<f64>();

    let mut resolver =
        resolver_with(displacement).with_config(AvoidConfig::default().with_potential_budget(0.1));

    let collision = Collision::new(SegmentId(0), SegmentId(1), SegmentId(2), 0);
    assert_eq!(
        resolver.resolve(&mut graph, &collision, RADIUS)?,
        Resolution::Unresolvable
    );
    assert_eq!(graph.len(), 3);
    Ok(())
}

#[test]
fn budget_is_measured_against_the_replaced_segment() -> Result<(), Box<dyn std::error::Error>> {
    let collision = Collision::new(SegmentId(0), SegmentId(1), SegmentId(2), 0);

    // Every polyline costs 1, plus its displacement. Segment 1 costs 1,
    // a detour of it 1.6.
    let displacement = |path: &LineString<f64>| {
        1.0 + path.coords().map(|c| c.y.abs()).sum::<f64>()
    };

    for (budget, fits) in [(0.5, false), (0.7, true)] {
        let mut graph = corridor(&[0.6, 0.6, 0.6])?;
        let mut resolver = resolver_with(displacement)
            .with_config(AvoidConfig::default().with_potential_budget(budget));

        let resolution = resolver.resolve(&mut graph, &collision, RADIUS)?;
        assert_eq!(resolution.is_resolved(), fits, "budget {budget}");
    }

    // A side lowering the potential fits without any budget
    let mut graph = corridor(&[0.6, 0.5, 0.6])?;
    let leftward = |path: &LineString<f64>| path.coords().map(|c| c.y).sum::<f64>();
    let mut resolver =
        resolver_with(leftward).with_config(AvoidConfig::default().with_potential_budget(0.0));

    let segments = resolved(resolver.resolve(&mut graph, &collision, RADIUS)?);
    assert!(max_lateral(graph.get(segments[1])?.path()) < 0.0);
    Ok(())
}

#[test]
fn occupied_upstream_segments_block_backtracking() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = corridor(&[0.6, 0.6, 0.25, 0.6])?;

    let mut table = RouteTable::new();
    table.set_route(
        RobotId(1),
        [RouteEntry::new(SegmentId(0), TimeWindow::new(4, 6))],
    );

    let mut resolver =
        BacktrackingAvoidResolution::new(Arc::new(table), Arc::new(FlatPotential), 1);

    let collision = Collision::new(SegmentId(1), SegmentId(2), SegmentId(3), 0)
        .with_robot(RobotId(0), TimeWindow::new(7, 9))
        .with_upstream([SegmentId(0)]);

    // Widened by one step, the window meets robot 1 on segment 0
    assert_eq!(
        resolver.resolve(&mut graph, &collision, RADIUS)?,
        Resolution::Unresolvable
    );
    assert_eq!(resolver.attempt().avoided().collect::<Vec<_>>(), ids(&[1]));
    Ok(())
}

#[test_log::test]
fn resolution_clears_the_route_table() -> Result<(), Box<dyn std::error::Error>> {
    let mut graph = corridor(&[0.6, 0.5, 0.6])?;

    let mut table = RouteTable::new();
    table.set_route(
        RobotId(0),
        [
            RouteEntry::new(SegmentId(0), TimeWindow::new(0, 4)),
            RouteEntry::new(SegmentId(1), TimeWindow::new(5, 9)),
            RouteEntry::new(SegmentId(2), TimeWindow::new(10, 14)),
        ],
    );
    table.set_route(
        RobotId(1),
        [RouteEntry::new(SegmentId(1), TimeWindow::new(3, 12))],
    );

    let collision = table.collision(RobotId(0), 0).expect("routes cross");
    let mut resolver =
        BacktrackingAvoidResolution::new(Arc::new(table.clone()), Arc::new(FlatPotential), 0);

    let resolution = resolver.resolve(&mut graph, &collision, RADIUS)?;
    assert_eq!(resolution.segments(), Some(&ids(&[0, 3, 2])[..]));

    assert!(table.apply(RobotId(0), &resolution, 5));
    assert!(table.first_collision(RobotId(0), 0).is_none());
    Ok(())
}

#[test]
fn config_reads_overrides() -> Result<(), ConfigError> {
    let vars = HashMap::from([
        (config::RAMP_FRACTION_VAR, "0.1".to_string()),
        (config::POTENTIAL_BUDGET_VAR, " 2.5 ".to_string()),
    ]);

    let config = AvoidConfig::from_lookup(|name| vars.get(name).cloned())?;
    assert_eq!(config.ramp_fraction, 0.1);
    assert_eq!(config.potential_budget, 2.5);
    assert_eq!(config.min_lateral_offset, AvoidConfig::default().min_lateral_offset);
    Ok(())
}

#[test]
fn config_rejects_bad_values() {
    let lookup = |value: &'static str| {
        move |name: &'static str| (name == config::RAMP_FRACTION_VAR).then(|| value.to_string())
    };

    assert!(matches!(
        AvoidConfig::from_lookup(lookup("wide")),
        Err(ConfigError::NotANumber { .. })
    ));
    assert!(matches!(
        AvoidConfig::from_lookup(lookup("0.75")),
        Err(ConfigError::OutOfRange { .. })
    ));
    assert!(AvoidConfig::default().validate().is_ok());
    assert!(AvoidConfig::default().with_min_lateral_offset(-1.0).validate().is_err());
}
