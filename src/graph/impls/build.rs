use crate::graph::{Crossing, GraphError, SegmentGraph};

use codec::Segment;
use geo::LineString;
use log::{debug, info};
use std::time::Instant;

impl SegmentGraph {
    /// Builds a linked roadmap from unlinked polylines, each paired with
    /// its clearance radius.
    ///
    /// Segments receive identifiers in input order. Endpoints closer than
    /// `crossing_radius` are merged into a [`Crossing`], which snaps them
    /// onto a common center and links arriving to departing segments.
    pub fn from_polylines(
        polylines: impl IntoIterator<Item = (LineString<f64>, f64)>,
        crossing_radius: f64,
    ) -> Result<Self, GraphError> {
        let start_time = Instant::now();
        let mut graph = SegmentGraph::new();

        for (path, min_path_space) in polylines {
            let id = graph.mint_id();
            graph.insert(Segment::new(id, path, min_path_space)?)?;
        }

        let endpoints = graph
            .iter()
            .flat_map(|segment| [segment.start(), segment.end()])
            .collect::<Vec<_>>();

        let mut crossings = Crossing::cluster(endpoints, crossing_radius)?;
        debug!("Clustered {} crossings in {:?}", crossings.len(), start_time.elapsed());

        for crossing in crossings.iter_mut() {
            for segment in graph.iter() {
                crossing.try_add_segment(segment, crossing_radius);
            }
        }

        for crossing in &crossings {
            crossing.merge(&mut graph)?;
        }

        info!(
            "Built roadmap of {} segments joined at {} crossings in {:?}",
            graph.len(),
            crossings.len(),
            start_time.elapsed()
        );

        Ok(graph)
    }
}
