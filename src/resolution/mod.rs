//! Conflict resolution over the roadmap.
//!
//! When two robots claim the same segment during overlapping windows, a
//! [`CollisionResolution`] strategy rewrites the route of one of them. The
//! only strategy shipped is [`BacktrackingAvoidResolution`], which offsets a
//! detour sideways and, when the corridor is too narrow, starts the detour
//! further upstream.

pub mod attempt;
pub mod backtracking;
pub mod config;
pub mod definition;
pub mod error;

#[doc(inline)]
pub use attempt::ResolutionAttempt;
#[doc(inline)]
pub use backtracking::BacktrackingAvoidResolution;
#[doc(inline)]
pub use config::{AvoidConfig, ConfigError};
#[doc(inline)]
pub use definition::*;
#[doc(inline)]
pub use error::ResolveError;

#[cfg(test)]
mod test;
