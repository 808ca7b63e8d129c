//! Per-run shared-mobility overlay.
//!
//! Availability is pulled from the configured feeds once per run; the
//! vehicle-transfer network between renting stations is discovered lazily,
//! round by round, as the search reaches new stations. Vehicle edges are a
//! transfer layer of their own, kept apart from walking so the search cannot
//! ride through inactive docks.

use fixedbitset::FixedBitSet;
use hashbrown::{HashMap, HashSet};
use log::{debug, warn};

use crate::model::shared_mobility::{
    RentingStationStatus, SharedMobilityConfig, VehicleTransfer,
};
use crate::model::timetable::{StopId, Timetable, TransportType};
use crate::routing::RaptorError;
use crate::routing::labels::RaptorLabel;
use crate::routing::raptor::engine::{RoundEngine, TransferEdge};

/// Mutable overlay state owned by one query run.
pub(crate) struct SharedMobilityState {
    preferred_vehicle: TransportType,
    enable_car: bool,
    /// Stations that currently cannot hand out a vehicle.
    no_source: HashSet<StopId>,
    /// Stations that currently cannot take a vehicle back.
    no_destination: HashSet<StopId>,
    /// Renting stations reached so far, in discovery order.
    visited: Vec<StopId>,
    visited_set: HashSet<StopId>,
    /// Vehicle transfers generated so far, in creation order.
    vehicle_transfers: Vec<VehicleTransfer>,
    transfer_keys: HashSet<(StopId, StopId)>,
}

impl SharedMobilityState {
    /// Refreshes availability from every configured feed. A feed that fails
    /// to deliver its status is excluded: its stations count as neither
    /// valid sources nor valid destinations for this run.
    pub fn initialize(timetable: &Timetable, config: &SharedMobilityConfig) -> Self {
        let mut statuses: HashMap<String, HashMap<String, RentingStationStatus>> = HashMap::new();
        for feed in &config.feeds {
            match feed.status() {
                Ok(entries) => {
                    let by_station = entries
                        .into_iter()
                        .map(|status| (status.station_id.clone(), status))
                        .collect();
                    statuses.insert(feed.system_id().to_string(), by_station);
                }
                Err(err) => {
                    warn!(
                        "Excluding shared mobility feed '{}' from this run: {err}",
                        feed.system_id()
                    );
                }
            }
        }

        let mut no_source = HashSet::new();
        let mut no_destination = HashSet::new();
        for stop in &timetable.stops {
            let Some(renting) = &stop.renting else {
                continue;
            };
            let status = statuses
                .get(&renting.system_id)
                .and_then(|by_station| by_station.get(&stop.id));
            match status {
                Some(status) => {
                    if !status.valid_source() {
                        no_source.insert(stop.index);
                    }
                    if !status.valid_destination(renting.capacity) {
                        no_destination.insert(stop.index);
                    }
                }
                None => {
                    no_source.insert(stop.index);
                    no_destination.insert(stop.index);
                }
            }
        }
        debug!(
            "Shared mobility availability: {} stations unavailable as source, {} as destination",
            no_source.len(),
            no_destination.len()
        );

        SharedMobilityState {
            preferred_vehicle: config.preferred_vehicle,
            enable_car: config.enable_car,
            no_source,
            no_destination,
            visited: Vec::new(),
            visited_set: HashSet::new(),
            vehicle_transfers: Vec::new(),
            transfer_keys: HashSet::new(),
        }
    }

    /// Records every renting station among `stops` as visited.
    pub fn note_visited(&mut self, timetable: &Timetable, stops: impl Iterator<Item = StopId>) {
        for stop in stops {
            if timetable.stops[stop].is_renting_station() && self.visited_set.insert(stop) {
                self.visited.push(stop);
            }
        }
    }

    fn is_visited(&self, stop: StopId) -> bool {
        self.visited_set.contains(&stop)
    }

    /// Generates the directed vehicle transfer `from → to` if the stations
    /// share a system, support a common vehicle kind and are both available.
    fn try_add_vehicle_transfer(&mut self, timetable: &Timetable, from: StopId, to: StopId) {
        if self.transfer_keys.contains(&(from, to)) {
            return;
        }
        let (from_stop, to_stop) = (&timetable.stops[from], &timetable.stops[to]);
        let (Some(a), Some(b)) = (&from_stop.renting, &to_stop.renting) else {
            return;
        };
        if a.system_id != b.system_id {
            return;
        }

        let mut common: Vec<TransportType> = a
            .transport_types
            .iter()
            .copied()
            .filter(|t| b.transport_types.contains(t))
            .collect();
        if !self.enable_car {
            common.retain(|&t| t != TransportType::Car);
        }
        if common.is_empty() {
            return;
        }

        let vehicle = if common.contains(&self.preferred_vehicle) {
            self.preferred_vehicle
        } else {
            // Fall back to the fastest kind both stations support.
            common
                .iter()
                .copied()
                .fold(common[0], |best, candidate| {
                    let best_speed = best.vehicle_speed_kmh().unwrap_or(0.0);
                    let speed = candidate.vehicle_speed_kmh().unwrap_or(0.0);
                    if speed > best_speed { candidate } else { best }
                })
        };

        if self.no_source.contains(&from) || self.no_destination.contains(&to) {
            return;
        }
        if let Some(transfer) = VehicleTransfer::between(from_stop, to_stop, vehicle) {
            self.transfer_keys.insert((from, to));
            self.vehicle_transfers.push(transfer);
        }
    }

    /// Vehicle transfers arriving at any of the given stations, in creation
    /// order.
    fn transfers_into(&self, targets: &HashSet<StopId>) -> Vec<VehicleTransfer> {
        self.vehicle_transfers
            .iter()
            .filter(|t| targets.contains(&t.to_stop))
            .cloned()
            .collect()
    }
}

impl<L: RaptorLabel> RoundEngine<'_, L> {
    /// Phase D: extends this round's improvements through the shared-mobility
    /// network. Consumes the stops marked by the walking relaxation, returns
    /// the stops improved by riding a vehicle and walking back into the
    /// transit network.
    pub(super) fn improve_with_shared_mob(
        &mut self,
        k: usize,
        state: &mut SharedMobilityState,
        transfer_marked: &FixedBitSet,
    ) -> Result<FixedBitSet, RaptorError> {
        let timetable = self.timetable();

        let marked_renting: Vec<StopId> = transfer_marked
            .ones()
            .filter(|&stop| self.is_renting_station(stop))
            .collect();
        let new_stations: Vec<StopId> = marked_renting
            .iter()
            .copied()
            .filter(|&stop| !state.is_visited(stop))
            .collect();
        debug!(
            "Round {k}: {} renting stations reachable, {} new",
            marked_renting.len(),
            new_stations.len()
        );
        if new_stations.is_empty() {
            return Ok(FixedBitSet::with_capacity(timetable.stops.len()));
        }
        state.note_visited(timetable, new_stations.iter().copied());

        // A vehicle edge for every (visited, new) station pair. The visited
        // set already includes this round's discoveries, so pairs between
        // two stations found in the same round are covered too.
        let visited_snapshot = state.visited.clone();
        for &from in &visited_snapshot {
            for &to in &new_stations {
                if from != to {
                    state.try_add_vehicle_transfer(timetable, from, to);
                }
            }
        }

        // Ride only the edges arriving at newly discovered stations.
        let targets: HashSet<StopId> = new_stations.iter().copied().collect();
        let selected = state.transfers_into(&targets);
        let mut sources = FixedBitSet::with_capacity(timetable.stops.len());
        for transfer in &selected {
            sources.set(transfer.from_stop, true);
        }
        let improved = self.relax_transfers(k, &sources, |stop| {
            selected
                .iter()
                .filter(|t| t.from_stop == stop)
                .map(|t| TransferEdge {
                    to: t.to_stop,
                    duration: t.duration,
                    mode: t.transport_type,
                })
                .collect()
        })?;
        debug!(
            "Round {k}: {} renting stations improved by vehicle transfers",
            improved.count_ones(..)
        );

        // Walk the improvements back into the public transit network.
        self.relax_walking_transfers(k, &improved)
    }
}
