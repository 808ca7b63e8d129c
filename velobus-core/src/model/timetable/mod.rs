//! Timetable data model.

pub mod data;
pub mod types;

pub use data::Timetable;
pub use types::{
    MEAN_FOOT_SPEED_KMH, Route, RouteId, RouteInfo, Station, StationId, Stop, StopId, Time,
    Transfer, TransportType, Trip, TripId, TripStopTime,
};
