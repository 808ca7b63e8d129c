//! Core timetable vocabulary: stations, stops, trips, routes and transfers.
//!
//! All cross-references between entities use dense indices assigned at build
//! time, so the whole timetable is a set of flat, immutable arenas.

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Serialize};

use crate::model::shared_mobility::RentingData;

/// Seconds past midnight of the service date. May exceed 86 400 for trips
/// running past midnight.
pub type Time = u32;

/// Dense index of a stop in [`Timetable::stops`](super::Timetable::stops).
pub type StopId = usize;
/// Dense index of a station in [`Timetable::stations`](super::Timetable::stations).
pub type StationId = usize;
/// Dense index of a scheduled trip in [`Timetable::trips`](super::Timetable::trips).
pub type TripId = usize;
/// Dense index of a route in [`Timetable::routes`](super::Timetable::routes).
pub type RouteId = usize;

/// Mean walking speed, used for walking transfers and the shared-mobility
/// speed table.
pub const MEAN_FOOT_SPEED_KMH: f64 = 5.0;

/// Transport mode of a trip or transfer.
///
/// The scheduled variants map the GTFS `route_type` integer codes; the four
/// street modes are used by synthetic transfer trips only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransportType {
    Walk,
    Bike,
    ElectricBike,
    Car,
    LightRail,
    Metro,
    Rail,
    Bus,
    Ferry,
    CableTram,
    AerialLift,
    Funicular,
    TrolleyBus,
    Monorail,
}

impl TransportType {
    /// Maps a GTFS `route_type` code to a transport type.
    pub fn from_gtfs_route_type(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::LightRail),
            1 => Some(Self::Metro),
            2 => Some(Self::Rail),
            3 => Some(Self::Bus),
            4 => Some(Self::Ferry),
            5 => Some(Self::CableTram),
            6 => Some(Self::AerialLift),
            7 => Some(Self::Funicular),
            11 => Some(Self::TrolleyBus),
            12 => Some(Self::Monorail),
            _ => None,
        }
    }

    /// Average CO₂ emissions in grams per passenger-km for this mode.
    pub fn emission_factor(self) -> f64 {
        match self {
            Self::Walk | Self::Bike => 0.0,
            Self::ElectricBike => 14.0,
            // Average between petrol and diesel passenger cars.
            Self::Car => 182.0,
            Self::Rail => 41.0,
            // Monorails, cable cars and trolleybuses are assumed to have the
            // same impact as light rail: all electrically powered.
            Self::LightRail
            | Self::Monorail
            | Self::CableTram
            | Self::Funicular
            | Self::AerialLift
            | Self::TrolleyBus => 35.0,
            Self::Metro => 31.0,
            Self::Bus => 105.0,
            // Foot passenger on a ferry.
            Self::Ferry => 19.0,
        }
    }

    /// Constant cruising speed in km/h for the modes a shared-mobility
    /// vehicle transfer can use. `None` for scheduled transit modes.
    pub fn vehicle_speed_kmh(self) -> Option<f64> {
        match self {
            Self::Walk => Some(MEAN_FOOT_SPEED_KMH),
            Self::Bike => Some(20.0),
            Self::ElectricBike => Some(25.0),
            Self::Car => Some(50.0),
            _ => None,
        }
    }
}

/// A station groups the platforms (stops) passengers perceive as one place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    pub id: String,
    pub name: String,
    /// Child stops, in insertion order.
    pub stops: Vec<StopId>,
}

/// A single boarding platform with a dense index and a geographic position.
///
/// Renting stations of the shared-mobility overlay are ordinary stops with
/// `renting` present; arrays indexed by [`StopId`] stay uniform.
#[derive(Debug, Clone)]
pub struct Stop {
    pub id: String,
    pub name: String,
    pub station: StationId,
    pub platform_code: Option<String>,
    /// Dense index of this stop, equal to its position in the stop arena.
    pub index: StopId,
    pub location: Point<f64>,
    pub renting: Option<RentingData>,
}

impl Stop {
    /// Great-circle distance to another stop, in kilometers.
    pub fn distance_km(&self, other: &Stop) -> f64 {
        Haversine.distance(self.location, other.location) / 1000.0
    }

    pub fn is_renting_station(&self) -> bool {
        self.renting.is_some()
    }
}

/// Arrival and departure of one trip at one stop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripStopTime {
    pub stop: StopId,
    /// Sequence number of the stop within the trip.
    pub stop_idx: usize,
    pub dts_arr: Time,
    pub dts_dep: Time,
    /// Cumulative distance in km covered by the trip from its first stop.
    pub travelled_distance: f64,
}

/// Display information about the route a trip belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub transport_type: TransportType,
    pub name: String,
}

impl RouteInfo {
    pub fn transfer(transport_type: TransportType) -> Self {
        RouteInfo {
            transport_type,
            name: "Transfer".to_string(),
        }
    }
}

/// One concrete vehicle run: an ordered sequence of at least two stop times.
///
/// Invariant, checked at build time: for every adjacent pair (i, i + 1),
/// `arr_i <= dep_i <= arr_{i+1}`.
#[derive(Debug, Clone)]
pub struct Trip {
    pub index: TripId,
    /// Identifier carried over from the loader, kept for output only.
    pub source_id: String,
    pub route_info: RouteInfo,
    pub stop_times: Vec<TripStopTime>,
    /// Stop → position within `stop_times`.
    stop_index: hashbrown::HashMap<StopId, usize>,
}

impl Trip {
    pub fn new(
        index: TripId,
        source_id: String,
        route_info: RouteInfo,
        stop_times: Vec<TripStopTime>,
    ) -> Self {
        let stop_index = stop_times
            .iter()
            .map(|tst| (tst.stop, tst.stop_idx))
            .collect();
        Trip {
            index,
            source_id,
            route_info,
            stop_times,
            stop_index,
        }
    }

    pub fn stop_time(&self, stop: StopId) -> Option<&TripStopTime> {
        self.stop_index.get(&stop).map(|&i| &self.stop_times[i])
    }

    /// Ordered stop ids, used as the route-grouping key.
    pub fn stop_sequence(&self) -> Vec<StopId> {
        self.stop_times.iter().map(|tst| tst.stop).collect()
    }
}

/// Equivalence class of trips sharing the exact same ordered stop sequence.
#[derive(Debug, Clone)]
pub struct Route {
    pub index: RouteId,
    pub stops: Vec<StopId>,
    /// Member trips, sorted by departure time at the first stop.
    pub trips: Vec<TripId>,
    stop_order: hashbrown::HashMap<StopId, usize>,
}

impl Route {
    pub fn new(index: RouteId, stops: Vec<StopId>) -> Self {
        let stop_order = stops.iter().enumerate().map(|(i, &s)| (s, i)).collect();
        Route {
            index,
            stops,
            trips: Vec::new(),
            stop_order,
        }
    }

    /// Position of `stop` in this route's stop sequence.
    pub fn stop_index(&self, stop: StopId) -> Option<usize> {
        self.stop_order.get(&stop).copied()
    }
}

/// Directed walking edge between two stops with a fixed time cost.
///
/// Walking transfers are symmetric and registered in both directions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transfer {
    pub from_stop: StopId,
    pub to_stop: StopId,
    /// Seconds needed to complete the transfer.
    pub duration: Time,
}
