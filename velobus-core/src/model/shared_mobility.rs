//! Shared-mobility (GBFS-style) data model.
//!
//! Renting stations live in the timetable as ordinary stops carrying a
//! [`RentingData`]; everything that changes between runs (vehicle and dock
//! availability) is fetched through the [`SharedMobilityFeed`] trait and kept
//! in per-run state, never written back into the timetable.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::timetable::{StopId, Time, TransportType};

/// Static shared-mobility attributes of a renting-station stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentingData {
    /// Identifier of the shared-mobility system the station belongs to.
    pub system_id: String,
    /// Vehicle kinds rentable at this station.
    pub transport_types: Vec<TransportType>,
    /// Total number of docks.
    pub capacity: u32,
}

/// Static description of a renting station, as published by a feed's
/// `station_information` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentingStationInfo {
    pub station_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub capacity: u32,
}

/// Real-time availability of a renting station, as published by a feed's
/// `station_status` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentingStationStatus {
    pub station_id: String,
    pub is_installed: bool,
    pub is_renting: bool,
    pub is_returning: bool,
    pub num_docks_available: u32,
    pub num_vehicles_available: u32,
}

impl RentingStationStatus {
    /// True if a vehicle can currently be picked up here.
    pub fn valid_source(&self) -> bool {
        self.num_vehicles_available > 0 && self.is_installed && self.is_renting
    }

    /// True if a vehicle can currently be returned here.
    pub fn valid_destination(&self, capacity: u32) -> bool {
        self.num_vehicles_available < capacity && self.num_docks_available > 0 && self.is_returning
    }
}

/// Source of shared-mobility data for one system.
///
/// Implementations wrap a live GBFS feed or any equivalent source; fetching
/// is outside this crate. `stations` is consulted once when the timetable is
/// enriched, `status` once per query run.
pub trait SharedMobilityFeed {
    fn system_id(&self) -> &str;
    /// Vehicle kinds this system offers.
    fn transport_types(&self) -> &[TransportType];
    /// Static station list.
    fn stations(&self) -> Result<Vec<RentingStationInfo>, Error>;
    /// Current per-station availability.
    fn status(&self) -> Result<Vec<RentingStationStatus>, Error>;
}

/// A [`SharedMobilityFeed`] backed by in-memory data. Useful for tests and
/// for callers that fetch and cache feed documents themselves.
#[derive(Debug, Clone)]
pub struct StaticSharedMobilityFeed {
    pub system_id: String,
    pub transport_types: Vec<TransportType>,
    pub stations: Vec<RentingStationInfo>,
    pub status: Vec<RentingStationStatus>,
}

impl SharedMobilityFeed for StaticSharedMobilityFeed {
    fn system_id(&self) -> &str {
        &self.system_id
    }

    fn transport_types(&self) -> &[TransportType] {
        &self.transport_types
    }

    fn stations(&self) -> Result<Vec<RentingStationInfo>, Error> {
        Ok(self.stations.clone())
    }

    fn status(&self) -> Result<Vec<RentingStationStatus>, Error> {
        Ok(self.status.clone())
    }
}

/// Query-time configuration of the shared-mobility overlay.
pub struct SharedMobilityConfig<'a> {
    pub feeds: Vec<&'a dyn SharedMobilityFeed>,
    /// Vehicle kind preferred when a station pair supports several.
    pub preferred_vehicle: TransportType,
    /// If false, car transfers are never generated.
    pub enable_car: bool,
}

/// Directed vehicle edge between two renting stations of the same system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleTransfer {
    pub from_stop: StopId,
    pub to_stop: StopId,
    pub duration: Time,
    pub transport_type: TransportType,
    pub distance_km: f64,
}

impl VehicleTransfer {
    /// Builds the directed transfer for the given mode; the duration is the
    /// ceiling of distance over the mode's constant speed.
    pub fn between(
        from: &crate::model::timetable::Stop,
        to: &crate::model::timetable::Stop,
        transport_type: TransportType,
    ) -> Option<VehicleTransfer> {
        let speed = transport_type.vehicle_speed_kmh()?;
        let distance_km = from.distance_km(to);
        let duration = (3600.0 * distance_km / speed).ceil() as Time;
        Some(VehicleTransfer {
            from_stop: from.index,
            to_stop: to.index,
            duration,
            transport_type,
            distance_km,
        })
    }
}
