//! Data model for round-based public transit routing.
//!
//! Contains the immutable timetable arenas and the shared-mobility
//! vocabulary layered on top of them.

pub mod shared_mobility;
pub mod timetable;

pub use shared_mobility::{
    RentingData, RentingStationInfo, RentingStationStatus, SharedMobilityConfig,
    SharedMobilityFeed, StaticSharedMobilityFeed, VehicleTransfer,
};
pub use timetable::{
    Route, RouteId, RouteInfo, Station, StationId, Stop, StopId, Time, Timetable, Transfer,
    TransportType, Trip, TripId, TripStopTime,
};
