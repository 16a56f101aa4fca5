//! Arc-length helpers over a [`LineString`].

use crate::GeoError;

use geo::{Coord, Distance, Euclidean, LineString, Point};
use itertools::Itertools;

/// Arc-length parameterised access to a drivable polyline.
///
/// A *station* is the distance travelled along the polyline from its first
/// point, so station `0` is the start and station [`Polyline::arc_length`]
/// is the end.
pub trait Polyline {
    /// First point of the polyline.
    fn head(&self) -> Result<Coord, GeoError>;

    /// Last point of the polyline.
    fn tail(&self) -> Result<Coord, GeoError>;

    /// Total euclidean length.
    fn arc_length(&self) -> f64;

    /// Cumulative station of every vertex, starting at `0.0`.
    fn stations(&self) -> Vec<f64>;

    /// The point at the given station, clamped onto the polyline.
    fn point_at(&self, station: f64) -> Result<Coord, GeoError>;

    /// Unit normal pointing to the left of the direction of travel.
    ///
    /// ### Note
    /// On an interior vertex the normals of both adjacent pieces are averaged,
    /// so the displaced vertex bisects the corner.
    fn normal_at(&self, station: f64) -> Result<Coord, GeoError>;
}

fn left_normal(a: Coord, b: Coord) -> Option<Coord> {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len = dx.hypot(dy);
    (len > f64::EPSILON).then(|| Coord {
        x: -dy / len,
        y: dx / len,
    })
}

fn unit(c: Coord) -> Option<Coord> {
    let len = c.x.hypot(c.y);
    (len > f64::EPSILON).then(|| Coord {
        x: c.x / len,
        y: c.y / len,
    })
}

impl Polyline for LineString<f64> {
    fn head(&self) -> Result<Coord, GeoError> {
        self.0.first().copied().ok_or(GeoError::EmptyPolyline)
    }

    fn tail(&self) -> Result<Coord, GeoError> {
        self.0.last().copied().ok_or(GeoError::EmptyPolyline)
    }

    fn arc_length(&self) -> f64 {
        self.0
            .iter()
            .tuple_windows()
            .map(|(a, b)| Euclidean.distance(Point::from(*a), Point::from(*b)))
            .sum()
    }

    fn stations(&self) -> Vec<f64> {
        let mut travelled = 0.0;
        std::iter::once(0.0)
            .chain(self.0.iter().tuple_windows().map(|(a, b)| {
                travelled += Euclidean.distance(Point::from(*a), Point::from(*b));
                travelled
            }))
            .take(self.0.len())
            .collect()
    }

    fn point_at(&self, station: f64) -> Result<Coord, GeoError> {
        let head = self.head()?;
        if station <= 0.0 {
            return Ok(head);
        }

        let stations = self.stations();
        for ((sa, a), (sb, b)) in stations.iter().zip(self.0.iter()).tuple_windows() {
            if station <= *sb {
                let span = sb - sa;
                if span <= f64::EPSILON {
                    return Ok(*b);
                }

                let t = (station - sa) / span;
                if t >= 1.0 {
                    return Ok(*b);
                }

                return Ok(Coord {
                    x: a.x + (b.x - a.x) * t,
                    y: a.y + (b.y - a.y) * t,
                });
            }
        }

        self.tail()
    }

    fn normal_at(&self, station: f64) -> Result<Coord, GeoError> {
        if self.0.is_empty() {
            return Err(GeoError::EmptyPolyline);
        }

        let stations = self.stations();
        let pieces = self
            .0
            .iter()
            .tuple_windows()
            .zip(stations.iter().tuple_windows())
            .filter_map(|((a, b), (sa, sb))| Some((left_normal(*a, *b)?, *sa, *sb)))
            .collect::<Vec<_>>();

        const ON_VERTEX: f64 = 1e-9;

        let touching = pieces
            .iter()
            .filter(|(_, sa, sb)| station >= sa - ON_VERTEX && station <= sb + ON_VERTEX)
            .map(|(n, _, _)| *n)
            .collect::<Vec<_>>();

        let summed = match touching.as_slice() {
            [] => match (station <= 0.0, pieces.first(), pieces.last()) {
                (true, Some((n, _, _)), _) => *n,
                (false, _, Some((n, _, _))) => *n,
                _ => return Err(GeoError::DegeneratePolyline),
            },
            normals => normals.iter().fold(Coord::zero(), |acc, n| acc + *n),
        };

        // Opposing pieces (a hairpin) cancel out, fall back to the first one.
        unit(summed)
            .or_else(|| touching.first().copied())
            .ok_or(GeoError::DegeneratePolyline)
    }
}
