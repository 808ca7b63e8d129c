//! Trip handles shared by labels, criteria and reconstruction.
//!
//! Scheduled trips live in the timetable arena; transfer trips are
//! synthesized while a query runs and live in a per-run arena. A [`TripRef`]
//! addresses either, and a [`TripCtx`] resolves it against both arenas.

use serde::{Deserialize, Serialize};

use crate::model::timetable::{RouteInfo, StopId, Time, Timetable, TransportType};
use crate::routing::RaptorError;

/// Handle to a scheduled trip or to a per-run synthetic transfer trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TripRef {
    Scheduled(crate::model::timetable::TripId),
    Transfer(usize),
}

/// Synthetic two-stop trip recording a walk or vehicle transfer as a
/// first-class journey leg.
#[derive(Debug, Clone)]
pub struct TransferTrip {
    pub from_stop: StopId,
    pub to_stop: StopId,
    pub dep_time: Time,
    pub arr_time: Time,
    pub transport_type: TransportType,
    pub distance_km: f64,
}

/// Per-run arena owning every transfer trip synthesized during a query.
/// Arena positions double as the trips' per-run unique ids.
#[derive(Debug, Default)]
pub struct TransferTripArena {
    trips: Vec<TransferTrip>,
}

impl TransferTripArena {
    pub(crate) fn push(&mut self, trip: TransferTrip) -> usize {
        self.trips.push(trip);
        self.trips.len() - 1
    }

    pub(crate) fn get(&self, idx: usize) -> Result<&TransferTrip, RaptorError> {
        self.trips.get(idx).ok_or(RaptorError::InvalidTrip)
    }
}

/// Read-only view over the timetable and the per-run transfer-trip arena.
#[derive(Clone, Copy)]
pub(crate) struct TripCtx<'a> {
    pub timetable: &'a Timetable,
    pub arena: &'a TransferTripArena,
}

impl TripCtx<'_> {
    pub fn arrival_at(&self, trip: TripRef, stop: StopId) -> Result<Time, RaptorError> {
        match trip {
            TripRef::Scheduled(id) => self
                .timetable
                .trips
                .get(id)
                .ok_or(RaptorError::InvalidTrip)?
                .stop_time(stop)
                .map(|tst| tst.dts_arr)
                .ok_or(RaptorError::StopNotOnTrip),
            TripRef::Transfer(idx) => {
                let transfer = self.arena.get(idx)?;
                if stop == transfer.from_stop {
                    Ok(transfer.dep_time)
                } else if stop == transfer.to_stop {
                    Ok(transfer.arr_time)
                } else {
                    Err(RaptorError::StopNotOnTrip)
                }
            }
        }
    }

    pub fn departure_at(&self, trip: TripRef, stop: StopId) -> Result<Time, RaptorError> {
        match trip {
            TripRef::Scheduled(id) => self
                .timetable
                .trips
                .get(id)
                .ok_or(RaptorError::InvalidTrip)?
                .stop_time(stop)
                .map(|tst| tst.dts_dep)
                .ok_or(RaptorError::StopNotOnTrip),
            // Transfer trips depart as soon as they start and keep no slack
            // at the arrival end.
            TripRef::Transfer(_) => self.arrival_at(trip, stop),
        }
    }

    /// Cumulative distance of the trip at `stop`, in km from the trip start.
    pub fn cum_distance(&self, trip: TripRef, stop: StopId) -> Result<f64, RaptorError> {
        match trip {
            TripRef::Scheduled(id) => self
                .timetable
                .trips
                .get(id)
                .ok_or(RaptorError::InvalidTrip)?
                .stop_time(stop)
                .map(|tst| tst.travelled_distance)
                .ok_or(RaptorError::StopNotOnTrip),
            TripRef::Transfer(idx) => {
                let transfer = self.arena.get(idx)?;
                if stop == transfer.from_stop {
                    Ok(0.0)
                } else if stop == transfer.to_stop {
                    Ok(transfer.distance_km)
                } else {
                    Err(RaptorError::StopNotOnTrip)
                }
            }
        }
    }

    pub fn transport_type(&self, trip: TripRef) -> Result<TransportType, RaptorError> {
        match trip {
            TripRef::Scheduled(id) => self
                .timetable
                .trips
                .get(id)
                .map(|t| t.route_info.transport_type)
                .ok_or(RaptorError::InvalidTrip),
            TripRef::Transfer(idx) => Ok(self.arena.get(idx)?.transport_type),
        }
    }

    /// True for a transfer trip connecting two platforms of one station.
    pub fn is_same_station_transfer(&self, trip: TripRef) -> Result<bool, RaptorError> {
        match trip {
            TripRef::Scheduled(_) => Ok(false),
            TripRef::Transfer(idx) => {
                let transfer = self.arena.get(idx)?;
                let stops = &self.timetable.stops;
                Ok(stops[transfer.from_stop].station == stops[transfer.to_stop].station)
            }
        }
    }

    pub fn route_info(&self, trip: TripRef) -> Result<RouteInfo, RaptorError> {
        match trip {
            TripRef::Scheduled(id) => self
                .timetable
                .trips
                .get(id)
                .map(|t| t.route_info.clone())
                .ok_or(RaptorError::InvalidTrip),
            TripRef::Transfer(idx) => {
                Ok(RouteInfo::transfer(self.arena.get(idx)?.transport_type))
            }
        }
    }

    /// Stable display id: the loader's id for scheduled trips, the per-run
    /// counter for transfer trips.
    pub fn trip_display_id(&self, trip: TripRef) -> Result<String, RaptorError> {
        match trip {
            TripRef::Scheduled(id) => self
                .timetable
                .trips
                .get(id)
                .map(|t| t.source_id.clone())
                .ok_or(RaptorError::InvalidTrip),
            TripRef::Transfer(idx) => {
                self.arena.get(idx)?;
                Ok(format!("transfer-{idx}"))
            }
        }
    }
}
