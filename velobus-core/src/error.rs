use thiserror::Error;

use crate::routing::RaptorError;

/// Crate-level error type, covering configuration, data and I/O failures.
///
/// Algorithm-internal failures are raised as [`RaptorError`] and converted
/// at the public API boundary.
#[derive(Error, Debug)]
pub enum Error {
    #[error("station '{0}' not found in the timetable")]
    UnknownStation(String),
    #[error("invalid departure time '{0}', expected HH:MM:SS")]
    InvalidDepartureTime(String),
    #[error("round budget must be at least 1")]
    InvalidRounds,
    #[error("invalid timetable data: {0}")]
    InvalidData(String),
    #[error("shared mobility feed '{system_id}' unavailable: {reason}")]
    FeedUnavailable { system_id: String, reason: String },
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("output encoding failed: {0}")]
    EncodeError(#[from] rmp_serde::encode::Error),
    #[error("output decoding failed: {0}")]
    DecodeError(#[from] rmp_serde::decode::Error),
    #[error("routing error: {0}")]
    RoutingError(#[from] RaptorError),
}
