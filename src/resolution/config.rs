use std::env;
use std::str::FromStr;

use log::debug;
use thiserror::Error;

pub const MIN_LATERAL_OFFSET_VAR: &str = "ROADMAP_MIN_LATERAL_OFFSET";
pub const RAMP_FRACTION_VAR: &str = "ROADMAP_RAMP_FRACTION";
pub const POTENTIAL_BUDGET_VAR: &str = "ROADMAP_POTENTIAL_BUDGET";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} is not a number: {value:?}")]
    NotANumber { name: &'static str, value: String },

    #[error("{name} is out of range: {value}")]
    OutOfRange { name: &'static str, value: f64 },
}

/// Tunables of the lateral detour.
///
/// ### Example
/// ```rust
/// use roadmap_router::resolution::AvoidConfig;
///
/// let config = AvoidConfig::default().with_ramp_fraction(0.2);
/// assert_eq!(config.ramp_fraction, 0.2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AvoidConfig {
    /// Smallest sideways displacement worth creating a detour for.
    pub min_lateral_offset: f64,

    /// Fraction of the detour length spent ramping in (and out) of the
    /// displacement. Lies in `(0, 0.5]`.
    pub ramp_fraction: f64,

    /// How much more potential a detour may carry than the single segment
    /// it replaces, both measured by the resolver's potential calculator.
    pub potential_budget: f64,
}

impl Default for AvoidConfig {
    fn default() -> Self {
        Self {
            min_lateral_offset: 0.05,
            ramp_fraction: 0.25,
            potential_budget: f64::INFINITY,
        }
    }
}

impl AvoidConfig {
    pub fn with_min_lateral_offset(self, min_lateral_offset: f64) -> Self {
        Self {
            min_lateral_offset,
            ..self
        }
    }

    pub fn with_ramp_fraction(self, ramp_fraction: f64) -> Self {
        Self {
            ramp_fraction,
            ..self
        }
    }

    pub fn with_potential_budget(self, potential_budget: f64) -> Self {
        Self {
            potential_budget,
            ..self
        }
    }

    /// Loads the defaults, overridden by the environment (and a `.env` file,
    /// if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let parse = |name: &'static str| -> Result<Option<f64>, ConfigError> {
            lookup(name)
                .map(|value| {
                    f64::from_str(value.trim())
                        .map_err(|_| ConfigError::NotANumber { name, value })
                })
                .transpose()
        };

        let mut config = Self::default();
        if let Some(value) = parse(MIN_LATERAL_OFFSET_VAR)? {
            config.min_lateral_offset = value;
        }

        if let Some(value) = parse(RAMP_FRACTION_VAR)? {
            config.ramp_fraction = value;
        }

        if let Some(value) = parse(POTENTIAL_BUDGET_VAR)? {
            config.potential_budget = value;
        }

        config.validate()?;
        debug!("Loaded {config:?}");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_lateral_offset.is_nan() || self.min_lateral_offset < 0.0 {
            return Err(ConfigError::OutOfRange {
                name: MIN_LATERAL_OFFSET_VAR,
                value: self.min_lateral_offset,
            });
        }

        if self.ramp_fraction.is_nan() || self.ramp_fraction <= 0.0 || self.ramp_fraction > 0.5 {
            return Err(ConfigError::OutOfRange {
                name: RAMP_FRACTION_VAR,
                value: self.ramp_fraction,
            });
        }

        if self.potential_budget.is_nan() || self.potential_budget < 0.0 {
            return Err(ConfigError::OutOfRange {
                name: POTENTIAL_BUDGET_VAR,
                value: self.potential_budget,
            });
        }

        Ok(())
    }
}
