//! Loader-facing input types.
//!
//! A GTFS (or equivalent) loader produces a [`TimetableSource`]; this crate
//! never reads feed files itself. Identifiers are the loader's strings, all
//! times are seconds past midnight of the service date.

use std::path::PathBuf;

use crate::model::timetable::{Time, TransportType};

#[derive(Debug, Clone)]
pub struct SourceStation {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct SourceStop {
    pub id: String,
    pub name: String,
    /// Parent station id.
    pub station_id: String,
    pub platform_code: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone)]
pub struct SourceStopTime {
    pub stop_id: String,
    pub arrival: Time,
    pub departure: Time,
    /// Cumulative km from the start of the trip.
    pub travelled_distance: f64,
}

#[derive(Debug, Clone)]
pub struct SourceTrip {
    pub id: String,
    pub route_name: String,
    pub transport_type: TransportType,
    pub stop_times: Vec<SourceStopTime>,
}

#[derive(Debug, Clone)]
pub struct SourceTransfer {
    pub from_stop_id: String,
    pub to_stop_id: String,
    pub duration: Time,
}

/// In-memory timetable input, as handed over by the feed loader.
#[derive(Debug, Clone, Default)]
pub struct TimetableSource {
    /// Directory the feed was read from, retained for output metadata.
    pub original_source_dir: Option<PathBuf>,
    /// Service date tag, `YYYYMMDD`.
    pub date: Option<String>,
    pub stations: Vec<SourceStation>,
    pub stops: Vec<SourceStop>,
    pub trips: Vec<SourceTrip>,
    /// Walking transfers. Missing reverse directions are registered
    /// automatically at build time.
    pub transfers: Vec<SourceTransfer>,
}
