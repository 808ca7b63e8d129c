//! Round-based routing: criteria, labels, the RAPTOR engine variants and
//! journey reconstruction.

pub mod criteria;
pub mod journey;
pub(crate) mod labels;
pub(crate) mod raptor;
pub(crate) mod trips;

use thiserror::Error;

pub use criteria::{CriteriaConfig, Criterion, CriterionKind};
pub use journey::{Journey, Leg};

/// Algorithm-internal failures. Reaching any of these from the public query
/// API indicates inconsistent input data or a construction bug.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RaptorError {
    #[error("invalid stop id")]
    InvalidStop,
    #[error("invalid route id")]
    InvalidRoute,
    #[error("invalid trip reference")]
    InvalidTrip,
    #[error("trip does not serve the requested stop")]
    StopNotOnTrip,
    #[error("best label at the boarding stop lacks the '{0}' criterion")]
    MissingCriterion(&'static str),
    #[error("journey reconstruction failed")]
    InvalidJourney,
}
