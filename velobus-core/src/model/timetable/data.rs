//! The immutable timetable arena and its query surface.

use std::path::PathBuf;

use hashbrown::HashMap;
use log::debug;

use super::types::{Route, RouteId, Station, StationId, Stop, StopId, Time, Transfer, Trip, TripId};
use crate::routing::RaptorError;

/// Fully built, immutable transit timetable.
///
/// All per-entity collections are indexed by the dense ids assigned at build
/// time. The structure is never mutated by a query run; concurrent runs may
/// share it read-only.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    /// Directory of the feed the timetable was generated from, for output
    /// metadata only.
    pub original_source_dir: Option<PathBuf>,
    /// Service date tag, `YYYYMMDD`.
    pub date: Option<String>,
    pub stations: Vec<Station>,
    pub stops: Vec<Stop>,
    pub trips: Vec<Trip>,
    pub routes: Vec<Route>,
    pub transfers: Vec<Transfer>,
    pub(crate) station_by_name: HashMap<String, StationId>,
    pub(crate) stop_by_source_id: HashMap<String, StopId>,
    /// Routes serving each stop.
    pub(crate) stop_routes: Vec<Vec<RouteId>>,
    /// Outgoing transfer indices per stop.
    pub(crate) transfers_from: Vec<Vec<usize>>,
    /// (from, to) → transfer index.
    pub(crate) transfer_pairs: HashMap<(StopId, StopId), usize>,
}

impl Timetable {
    pub(crate) fn validate_stop(&self, stop: StopId) -> Result<(), RaptorError> {
        if stop >= self.stops.len() {
            Err(RaptorError::InvalidStop)
        } else {
            Ok(())
        }
    }

    /// Routes serving the given stop.
    pub fn routes_of_stop(&self, stop: StopId) -> &[RouteId] {
        &self.stop_routes[stop]
    }

    /// Outgoing transfers of the given stop.
    pub fn transfers_from(&self, stop: StopId) -> impl Iterator<Item = &Transfer> {
        self.transfers_from[stop].iter().map(|&i| &self.transfers[i])
    }

    /// The registered transfer between two stops, if any.
    pub fn transfer_between(&self, from: StopId, to: StopId) -> Option<&Transfer> {
        self.transfer_pairs.get(&(from, to)).map(|&i| &self.transfers[i])
    }

    /// Looks a station up by display name.
    pub fn station_by_name(&self, name: &str) -> Option<&Station> {
        self.station_by_name
            .get(name)
            .map(|&idx| &self.stations[idx])
    }

    /// Looks a stop up by its loader-assigned identifier.
    pub fn stop_by_source_id(&self, id: &str) -> Option<&Stop> {
        self.stop_by_source_id.get(id).map(|&idx| &self.stops[idx])
    }

    /// Great-circle distance between two stops, in kilometers.
    pub fn stop_distance_km(&self, a: StopId, b: StopId) -> f64 {
        self.stops[a].distance_km(&self.stops[b])
    }

    /// Earliest trip of `route` that can be boarded at `stop` departing at or
    /// after `dep_secs`.
    ///
    /// Ties on departure time are broken by the earlier arrival at the stop
    /// that follows the boarding stop in the route, so that among trips
    /// leaving together the one running ahead wins.
    pub fn earliest_trip(&self, route: RouteId, dep_secs: Time, stop: StopId) -> Option<TripId> {
        let route = &self.routes[route];
        let stop_idx = route.stop_index(stop)?;
        let probe_idx = (stop_idx + 1).min(route.stops.len() - 1);

        route
            .trips
            .iter()
            .filter_map(|&trip_id| {
                let tst = &self.trips[trip_id].stop_times[stop_idx];
                if tst.dts_dep >= dep_secs {
                    let next_arr = self.trips[trip_id].stop_times[probe_idx].dts_arr;
                    Some((tst.dts_dep, next_arr, trip_id))
                } else {
                    None
                }
            })
            .min_by_key(|&(dep, next_arr, _)| (dep, next_arr))
            .map(|(_, _, trip_id)| trip_id)
    }

    /// Logs entity counts, mirroring what the model builder reports.
    pub fn log_counts(&self) {
        debug!("Stations  : {}", self.stations.len());
        debug!("Stops     : {}", self.stops.len());
        debug!("Trips     : {}", self.trips.len());
        debug!("Routes    : {}", self.routes.len());
        debug!("Transfers : {}", self.transfers.len());
    }
}
