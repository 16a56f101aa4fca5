//! Lateral displacement of a polyline.
//!
//! A detour is built by displacing the centerline sideways along its normal.
//! The displacement follows a trapezoidal profile over arc length:
//!
//! ```text
//!   w ^        ________________
//!     |       /                \
//!     |      /                  \
//!   0 +-----+--+--------------+--+-----> station
//!           0  from·L     to·L    L
//! ```
//!
//! The end is always pinned (`w = 0`), so the displaced polyline still meets
//! its successor. The start is pinned too unless freed, in which case it
//! holds the full displacement.

use crate::{GeoError, Polyline};

use geo::{Coord, LineString};
use log::trace;
use strum::{Display, EnumIter};

/// Which side of the direction of travel a displacement lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum Side {
    /// Counter-clockwise from the direction of travel.
    Left,
    /// Clockwise from the direction of travel.
    Right,
}

impl Side {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Side::Left => 1.0,
            Side::Right => -1.0,
        }
    }
}

/// A configured lateral displacement, applied with [`LateralOffset::apply`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LateralOffset {
    distance: f64,
    side: Side,
    from: f64,
    to: f64,
    pin_start: bool,
}

impl LateralOffset {
    /// Displaces by `distance` toward `side`, ramping over the first and last
    /// quarter with both ends pinned.
    pub fn new(distance: f64, side: Side) -> Self {
        Self {
            distance,
            side,
            from: 0.25,
            to: 0.75,
            pin_start: true,
        }
    }

    /// Holds the full displacement between the fractions `from` and `to`
    /// of the arc length.
    pub fn with_span(self, from: f64, to: f64) -> Self {
        Self { from, to, ..self }
    }

    /// Symmetric span, ramping over `fraction` of the length at each end.
    pub fn with_ramp(self, fraction: f64) -> Self {
        self.with_span(fraction, 1.0 - fraction)
    }

    /// Lets the first point move with the displacement.
    pub fn free_start(self) -> Self {
        Self {
            pin_start: false,
            ..self
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    fn validate(&self) -> Result<(), GeoError> {
        if !self.distance.is_finite() || self.distance < 0.0 {
            return Err(GeoError::InvalidProfile("distance must be finite and positive"));
        }

        if !(0.0..=1.0).contains(&self.from) || !(0.0..=1.0).contains(&self.to) {
            return Err(GeoError::InvalidProfile("span must lie within [0, 1]"));
        }

        if self.from > self.to {
            return Err(GeoError::InvalidProfile("span start exceeds span end"));
        }

        Ok(())
    }

    /// Unsigned displacement at `station` along a polyline of length `length`.
    fn width(&self, station: f64, length: f64) -> f64 {
        let (s1, s2) = (self.from * length, self.to * length);
        let lerp = |a: f64, b: f64, t: f64| a + (b - a) * t.clamp(0.0, 1.0);

        if station < s1 {
            let start = if self.pin_start { 0.0 } else { self.distance };
            lerp(start, self.distance, station / s1)
        } else if station <= s2 {
            self.distance
        } else {
            lerp(self.distance, 0.0, (station - s2) / (length - s2))
        }
    }

    /// Produces the displaced polyline.
    ///
    /// Every vertex of the source is kept (displaced), and vertices are added
    /// at the ramp boundaries so the profile is represented exactly.
    pub fn apply(&self, path: &LineString<f64>) -> Result<LineString<f64>, GeoError> {
        self.validate()?;

        let (head, tail) = (path.head()?, path.tail()?);
        let length = path.arc_length();
        if path.0.len() < 2 || length <= f64::EPSILON {
            return Err(GeoError::DegeneratePolyline);
        }

        let mut stations = path.stations();
        stations.extend([self.from * length, self.to * length]);
        stations.sort_by(f64::total_cmp);
        stations.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

        let sign = self.side.sign();
        let mut points = stations
            .into_iter()
            .map(|station| {
                let base = path.point_at(station)?;
                let normal = path.normal_at(station)?;
                let width = sign * self.width(station, length);

                Ok(Coord {
                    x: base.x + normal.x * width,
                    y: base.y + normal.y * width,
                })
            })
            .collect::<Result<Vec<_>, GeoError>>()?;

        // Pinned ends are reproduced bit-for-bit.
        if self.pin_start {
            if let Some(first) = points.first_mut() {
                *first = head;
            }
        }

        if let Some(last) = points.last_mut() {
            *last = tail;
        }

        trace!(
            "Displaced {} points by {:.3} to the {}",
            points.len(),
            self.distance,
            self.side
        );

        Ok(LineString::new(points))
    }
}
