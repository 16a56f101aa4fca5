//! Potentials bias where a detour is placed.
//!
//! A potential is a scalar penalty over a polyline which grows near obstacles
//! or other agents. Lower is better, and `f64::INFINITY` marks geometry that
//! must never be used.

pub mod obstacle;

#[doc(inline)]
pub use obstacle::ObstaclePotential;

use geo::LineString;

/// Scores a polyline. Implementations must be pure: the same geometry
/// always yields the same potential.
pub trait PotentialCalculator {
    fn potential(&self, path: &LineString<f64>) -> f64;
}

impl<F> PotentialCalculator for F
where
    F: Fn(&LineString<f64>) -> f64,
{
    #[inline]
    fn potential(&self, path: &LineString<f64>) -> f64 {
        self(path)
    }
}

/// A potential which is zero everywhere, leaving the side choice to the
/// tie-break.
#[derive(Debug, Default, Clone, Copy)]
pub struct FlatPotential;

impl PotentialCalculator for FlatPotential {
    #[inline]
    fn potential(&self, _: &LineString<f64>) -> f64 {
        0.0
    }
}
