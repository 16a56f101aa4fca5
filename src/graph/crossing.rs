use crate::graph::{GraphError, SegmentGraph};

use codec::{Segment, SegmentId};
use geo::{Centroid, Coord, Distance, Euclidean, MultiPoint, Point};
use log::debug;

/// A junction where several segment endpoints converge.
///
/// A crossing is described by the points surrounding it and their centroid.
/// Segments are registered by identifier, never by reference, and merging a
/// crossing moves every registered endpoint onto the center before linking
/// each arriving segment to each departing one.
#[derive(Debug, Clone, PartialEq)]
pub struct Crossing {
    surrounding: Vec<Coord>,
    center: Coord,

    /// Segments whose first point lies at this crossing.
    starts: Vec<SegmentId>,
    /// Segments whose last point lies at this crossing.
    ends: Vec<SegmentId>,
}

impl Crossing {
    pub fn new(surrounding: Vec<Coord>) -> Result<Self, GraphError> {
        let center = MultiPoint::from(surrounding.clone())
            .centroid()
            .ok_or(GraphError::EmptyCrossing)?;

        Ok(Self {
            surrounding,
            center: center.0,
            starts: vec![],
            ends: vec![],
        })
    }

    /// Groups endpoints into crossings. A point joins the first crossing
    /// holding a point within `radius` of it, otherwise it opens a new one.
    pub fn cluster(
        points: impl IntoIterator<Item = Coord>,
        radius: f64,
    ) -> Result<Vec<Crossing>, GraphError> {
        let mut groups: Vec<Vec<Coord>> = vec![];

        for point in points {
            let near = |other: &Coord| {
                Euclidean.distance(Point::from(point), Point::from(*other)) <= radius
            };

            match groups.iter_mut().find(|group| group.iter().any(near)) {
                Some(group) => group.push(point),
                None => groups.push(vec![point]),
            }
        }

        groups.into_iter().map(Crossing::new).collect()
    }

    pub fn center(&self) -> Coord {
        self.center
    }

    pub fn surrounding(&self) -> &[Coord] {
        &self.surrounding
    }

    pub fn starts(&self) -> &[SegmentId] {
        &self.starts
    }

    pub fn ends(&self) -> &[SegmentId] {
        &self.ends
    }

    fn near(&self, point: Coord, radius: f64) -> bool {
        std::iter::once(&self.center)
            .chain(self.surrounding.iter())
            .any(|c| Euclidean.distance(Point::from(*c), Point::from(point)) <= radius)
    }

    /// Registers the segment if one of its endpoints lies within `radius`
    /// of the crossing. Returns whether it was registered.
    pub fn try_add_segment(&mut self, segment: &Segment, radius: f64) -> bool {
        let mut added = false;

        if self.near(segment.start(), radius) && !self.starts.contains(&segment.id()) {
            self.starts.push(segment.id());
            added = true;
        }

        if self.near(segment.end(), radius) && !self.ends.contains(&segment.id()) {
            self.ends.push(segment.id());
            added = true;
        }

        added
    }

    /// Moves every registered endpoint onto the center, then links every
    /// arriving segment to every departing segment.
    pub fn merge(&self, graph: &mut SegmentGraph) -> Result<(), GraphError> {
        for id in &self.starts {
            let segment = graph.segment_mut(*id)?;
            let mut path = segment.path().clone();
            if let Some(first) = path.0.first_mut() {
                *first = self.center;
            }
            segment.set_path(path)?;
        }

        for id in &self.ends {
            let segment = graph.segment_mut(*id)?;
            let mut path = segment.path().clone();
            if let Some(last) = path.0.last_mut() {
                *last = self.center;
            }
            segment.set_path(path)?;
        }

        for from in &self.ends {
            for to in self.starts.iter().filter(|to| *to != from) {
                graph.link(*from, *to)?;
            }
        }

        debug!(
            "Merged crossing at ({:.3}, {:.3}): {} arriving, {} departing",
            self.center.x,
            self.center.y,
            self.ends.len(),
            self.starts.len()
        );

        Ok(())
    }
}
