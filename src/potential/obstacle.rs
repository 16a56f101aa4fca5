use crate::potential::PotentialCalculator;

use geo::{Coord, Distance, Euclidean, LineString, Point};
use log::debug;
use roadmap_geo::Polyline;
use rstar::{AABB, Envelope, RTree};

#[cfg(feature = "tracing")]
use tracing::Level;

/// Distance between two samples taken along a polyline, unless configured.
pub const DEFAULT_SPACING: f64 = 0.1;

const MIN_SPACING: f64 = 1e-3;

/// A known obstacle, indexed by position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub position: Point,
}

impl rstar::PointDistance for Obstacle {
    fn distance_2(
        &self,
        point: &<Self::Envelope as Envelope>::Point,
    ) -> <<Self::Envelope as Envelope>::Point as rstar::Point>::Scalar {
        Euclidean.distance(self.position, *point).powi(2)
    }
}

impl rstar::RTreeObject for Obstacle {
    type Envelope = AABB<Point>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

/// Penalises a polyline by its distance to the nearest obstacles.
///
/// The polyline is sampled at every vertex and every `spacing` of arc length.
/// Each sample contributes `e^(-δ / decay)`, where `δ` is the distance to
/// its nearest obstacle, so the penalty decays smoothly away from walls.
/// A sample closer than `blocked_radius` makes the whole polyline unusable.
///
/// ### Note
/// Between samples the polyline may pass up to `spacing / 2` closer to an
/// obstacle than any sample did. Keep `spacing` well below `blocked_radius`.
///
/// ### Example
/// ```rust
/// use geo::{coord, line_string};
/// use roadmap_router::potential::{ObstaclePotential, PotentialCalculator};
///
/// let potential = ObstaclePotential::new([coord! { x: 0.0, y: 1.0 }], 0.5, 0.1);
/// let near = potential.potential(&line_string![(x: 0.0, y: 0.5), (x: 1.0, y: 0.5)]);
/// let far = potential.potential(&line_string![(x: 0.0, y: -0.5), (x: 1.0, y: -0.5)]);
/// assert!(near > far);
/// ```
#[derive(Debug, Clone)]
pub struct ObstaclePotential {
    index: RTree<Obstacle>,
    decay: f64,
    blocked_radius: f64,
    spacing: f64,
}

impl ObstaclePotential {
    pub fn new(obstacles: impl IntoIterator<Item = Coord>, decay: f64, blocked_radius: f64) -> Self {
        let obstacles = obstacles
            .into_iter()
            .map(|c| Obstacle {
                position: Point::from(c),
            })
            .collect::<Vec<_>>();

        debug!("Indexed {} obstacles", obstacles.len());
        Self {
            index: RTree::bulk_load(obstacles),
            decay,
            blocked_radius,
            spacing: DEFAULT_SPACING,
        }
    }

    pub fn with_spacing(self, spacing: f64) -> Self {
        Self {
            spacing: spacing.max(MIN_SPACING),
            ..self
        }
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn index(&self) -> &RTree<Obstacle> {
        &self.index
    }

    /// Every vertex of `path`, plus a point every `spacing` along it.
    fn samples(&self, path: &LineString<f64>) -> Vec<Point> {
        let length = path.arc_length();

        let mut stations = path.stations();
        stations.extend(
            (1u32..)
                .map(|k| f64::from(k) * self.spacing)
                .take_while(|station| *station < length),
        );
        stations.sort_by(f64::total_cmp);
        stations.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

        stations
            .into_iter()
            .filter_map(|station| path.point_at(station).ok())
            .map(Point::from)
            .collect()
    }

    /// Distance from `point` to the nearest obstacle, if any exists.
    pub fn clearance(&self, point: Point) -> Option<f64> {
        self.index
            .nearest_neighbor(&point)
            .map(|obstacle| Euclidean.distance(obstacle.position, point))
    }
}

impl PotentialCalculator for ObstaclePotential {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, level = Level::DEBUG))]
    fn potential(&self, path: &LineString<f64>) -> f64 {
        self.samples(path)
            .into_iter()
            .filter_map(|point| self.clearance(point))
            .map(|delta| {
                if delta < self.blocked_radius {
                    f64::INFINITY
                } else {
                    (-delta / self.decay).exp()
                }
            })
            .sum()
    }
}
