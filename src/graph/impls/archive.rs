use crate::graph::{GraphError, SegmentGraph};

use codec::GraphArchive;
use geo::Coord;
use log::debug;

impl SegmentGraph {
    /// Captures the graph for the [`Serializer`](codec::Serializer), along
    /// with the map metadata it was built from.
    pub fn archive(&self, origin: Coord, resolution: f64) -> GraphArchive {
        GraphArchive::new(self.iter(), origin, resolution)
    }

    /// Restores an archived graph, validating every stored link.
    pub fn from_archive(archive: GraphArchive) -> Result<Self, GraphError> {
        let graph = Self::from_segments(archive.into_segments()?)?;
        debug!("Restored {graph:?} from archive");
        Ok(graph)
    }
}
