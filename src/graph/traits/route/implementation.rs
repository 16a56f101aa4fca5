use crate::graph::{Route, SegmentGraph};

use codec::SegmentId;
use log::debug;
#[cfg(feature = "tracing")]
use tracing::Level;

impl Route for SegmentGraph {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), level = Level::DEBUG))]
    fn route(&self, start: SegmentId, finish: SegmentId) -> Option<(f64, Vec<SegmentId>)> {
        debug!("Routing {start} -> {finish}");

        if !self.contains(start) || !self.contains(finish) {
            return None;
        }

        petgraph::algo::astar(
            &self.topology(),
            start,
            |segment| segment == finish,
            |(_, _, length)| *length,
            |_| 0.0,
        )
    }
}
