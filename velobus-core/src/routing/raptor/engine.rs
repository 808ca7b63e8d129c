//! The shared round skeleton of the RAPTOR variants.
//!
//! One round performs route accumulation, route traversal and footpath
//! relaxation, in that order; the shared-mobility overlay appends its own
//! relaxation phase. `bag[k]` starts as a copy of `bag[k - 1]` and is only
//! improved, so earlier rounds stay readable while a round runs.

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use log::debug;

use crate::model::timetable::{RouteId, StopId, Time, Timetable, TransportType};
use crate::routing::RaptorError;
use crate::routing::criteria::LabelUpdate;
use crate::routing::labels::{Bag, RaptorLabel};
use crate::routing::raptor::shared_mob::SharedMobilityState;
use crate::routing::trips::{TransferTrip, TransferTripArena, TripCtx, TripRef};

/// One relaxable edge, either a walking transfer or a vehicle transfer.
#[derive(Debug, Clone)]
pub(crate) struct TransferEdge {
    pub to: StopId,
    pub duration: Time,
    pub mode: TransportType,
}

/// Result of a round-based run: the per-round bags, the arena owning the
/// synthesized transfer trips, and the index of the last completed round.
pub(crate) struct RaptorRun<L> {
    pub bags: Vec<Vec<Bag<L>>>,
    pub arena: TransferTripArena,
    pub actual_rounds: usize,
}

impl<L: RaptorLabel> RaptorRun<L> {
    /// Bags of the last completed round.
    pub fn final_bags(&self) -> &[Bag<L>] {
        &self.bags[self.actual_rounds]
    }
}

pub(crate) struct RoundEngine<'a, L> {
    timetable: &'a Timetable,
    bags: Vec<Vec<Bag<L>>>,
    /// Best-so-far label per stop across rounds; prefix-dependent criterion
    /// updates read through this.
    best: Vec<Option<L>>,
    arena: TransferTripArena,
}

impl<'a, L: RaptorLabel> RoundEngine<'a, L> {
    pub fn new(timetable: &'a Timetable) -> Self {
        RoundEngine {
            timetable,
            bags: Vec::new(),
            best: vec![None; timetable.stops.len()],
            arena: TransferTripArena::default(),
        }
    }

    /// Executes the round-based search.
    ///
    /// `make_initial` builds the departure label for each origin stop.
    /// `sm` enables the shared-mobility overlay. `keep_going` is consulted
    /// between rounds; returning false truncates the run at the last
    /// completed round.
    pub fn run(
        mut self,
        from_stops: &[StopId],
        rounds: usize,
        make_initial: impl Fn(StopId) -> L,
        mut sm: Option<&mut SharedMobilityState>,
        keep_going: impl Fn(usize) -> bool,
    ) -> Result<RaptorRun<L>, RaptorError> {
        for &stop in from_stops {
            self.timetable.validate_stop(stop)?;
        }
        let num_stops = self.timetable.stops.len();

        // Round 0: departure labels at the origin stops.
        self.bags.push(vec![Bag::new(); num_stops]);
        let mut marked = FixedBitSet::with_capacity(num_stops);
        for &stop in from_stops {
            if self.bags[0][stop].add(make_initial(stop)) {
                marked.set(stop, true);
                self.refresh_best(0, stop);
            }
        }

        if let Some(state) = sm.as_deref_mut() {
            state.note_visited(self.timetable, marked.ones());
        }

        // Immediate transfers: widen the reachable set before round one.
        let immediate = self.relax_walking_transfers(0, &marked)?;
        debug!("{} stops reachable by an immediate transfer", immediate.count_ones(..));
        if let Some(state) = sm.as_deref_mut() {
            state.note_visited(self.timetable, immediate.ones());
        }
        marked.union_with(&immediate);

        let mut actual_rounds = 0;
        for k in 1..=rounds {
            if marked.is_clear() {
                debug!("No stop marked, stopping after round {}", k - 1);
                break;
            }
            if !keep_going(k) {
                debug!("Run cancelled before round {k}");
                break;
            }
            actual_rounds = k;
            debug!("Round {k}: {} stops to evaluate", marked.count_ones(..));

            self.bags.push(self.bags[k - 1].clone());

            let route_marked = self.accumulate_routes(&marked)?;
            let trip_marked = self.traverse_routes(k, &route_marked)?;
            let transfer_marked = self.relax_walking_transfers(k, &trip_marked)?;

            marked = trip_marked;
            marked.union_with(&transfer_marked);

            if let Some(state) = sm.as_deref_mut() {
                // Renting stations are reachable by foot only, so the
                // overlay consumes the transfer-marked set.
                let sm_marked = self.improve_with_shared_mob(k, state, &transfer_marked)?;
                marked.union_with(&sm_marked);
            }
        }

        Ok(RaptorRun {
            bags: self.bags,
            arena: self.arena,
            actual_rounds,
        })
    }

    /// Phase A: the route queue Q, pairing each route serving a marked stop
    /// with the earliest marked stop along it.
    fn accumulate_routes(
        &self,
        marked: &FixedBitSet,
    ) -> Result<Vec<(RouteId, StopId)>, RaptorError> {
        let mut queue: HashMap<RouteId, StopId> = HashMap::new();
        for stop in marked.ones() {
            for &route_id in self.timetable.routes_of_stop(stop) {
                let route = &self.timetable.routes[route_id];
                let position = route.stop_index(stop).ok_or(RaptorError::InvalidRoute)?;
                match queue.entry(route_id) {
                    hashbrown::hash_map::Entry::Occupied(mut entry) => {
                        let current = route
                            .stop_index(*entry.get())
                            .ok_or(RaptorError::InvalidRoute)?;
                        if position < current {
                            entry.insert(stop);
                        }
                    }
                    hashbrown::hash_map::Entry::Vacant(entry) => {
                        entry.insert(stop);
                    }
                }
            }
        }

        let mut pairs: Vec<(RouteId, StopId)> = queue.into_iter().collect();
        // Route order must not depend on map iteration.
        pairs.sort_unstable_by_key(|&(route, _)| route);
        debug!("{} routes serve the marked stops", pairs.len());
        Ok(pairs)
    }

    /// Phase B: traverse every queued route from its earliest marked stop,
    /// carrying a route bag of labels riding the route's trips.
    fn traverse_routes(
        &mut self,
        k: usize,
        route_marked: &[(RouteId, StopId)],
    ) -> Result<FixedBitSet, RaptorError> {
        let mut new_marked = FixedBitSet::with_capacity(self.timetable.stops.len());

        for &(route_id, first_stop) in route_marked {
            let route = &self.timetable.routes[route_id];
            let start = route
                .stop_index(first_stop)
                .ok_or(RaptorError::InvalidRoute)?;

            let mut route_bag: Bag<L> = Bag::new();
            for &stop in &route.stops[start..] {
                // Ride every label's assigned trip to this stop.
                let mut advanced = Bag::new();
                for label in route_bag.labels() {
                    let trip = label.trip().ok_or(RaptorError::InvalidTrip)?;
                    let data = LabelUpdate {
                        boarding_stop: label.boarding_stop(),
                        arrival_stop: stop,
                        old_trip: Some(trip),
                        new_trip: trip,
                        ctx: TripCtx {
                            timetable: self.timetable,
                            arena: &self.arena,
                        },
                        best_labels: &self.best,
                    };
                    advanced.add(label.update(&data)?);
                }
                route_bag = advanced;

                // Offer the riding labels to the stop's round bag.
                if self.bags[k][stop].merge(&route_bag) {
                    new_marked.set(stop, true);
                    self.refresh_best(k, stop);
                }

                // Pick up labels settled at this stop in the previous round
                // and (re)assign every label the earliest boardable trip.
                route_bag.merge(&self.bags[k - 1][stop]);
                let mut boarded = Bag::new();
                for label in route_bag.labels() {
                    let Some(trip_id) =
                        self.timetable
                            .earliest_trip(route_id, label.arrival_time(), stop)
                    else {
                        // Nothing boardable here: the label leaves the route.
                        continue;
                    };
                    let new_trip = TripRef::Scheduled(trip_id);
                    if label.trip() == Some(new_trip) {
                        boarded.add(label.clone());
                    } else {
                        let data = LabelUpdate {
                            boarding_stop: stop,
                            arrival_stop: stop,
                            old_trip: label.trip(),
                            new_trip,
                            ctx: TripCtx {
                                timetable: self.timetable,
                                arena: &self.arena,
                            },
                            best_labels: &self.best,
                        };
                        boarded.add(label.update(&data)?);
                    }
                }
                route_bag = boarded;
            }
        }

        debug!("{} stops improved by trips", new_marked.count_ones(..));
        Ok(new_marked)
    }

    /// Phase C over the timetable's walking transfers.
    pub(super) fn relax_walking_transfers(
        &mut self,
        k: usize,
        marked: &FixedBitSet,
    ) -> Result<FixedBitSet, RaptorError> {
        let timetable = self.timetable;
        self.relax_transfers(k, marked, |stop| {
            timetable
                .transfers_from(stop)
                .map(|t| TransferEdge {
                    to: t.to_stop,
                    duration: t.duration,
                    mode: TransportType::Walk,
                })
                .collect()
        })
    }

    /// Footpath/vehicle relaxation: every label of a marked stop is pushed
    /// over each outgoing edge as a synthetic transfer trip. Transfers do
    /// not chain within one invocation.
    pub(super) fn relax_transfers(
        &mut self,
        k: usize,
        marked: &FixedBitSet,
        edges_from: impl Fn(StopId) -> Vec<TransferEdge>,
    ) -> Result<FixedBitSet, RaptorError> {
        let mut new_marked = FixedBitSet::with_capacity(self.timetable.stops.len());

        // Snapshot every source bag before merging anything, so transfers
        // cannot chain through each other inside one pass.
        let sources: Vec<(StopId, Vec<TransferEdge>, Vec<L>)> = marked
            .ones()
            .filter_map(|stop| {
                let bag = &self.bags[k][stop];
                if bag.is_empty() {
                    return None;
                }
                let edges = edges_from(stop);
                if edges.is_empty() {
                    None
                } else {
                    Some((stop, edges, bag.labels().to_vec()))
                }
            })
            .collect();

        for (stop, edges, source_labels) in sources {
            for edge in edges {
                let mut candidates = Bag::new();
                for label in &source_labels {
                    let departure = label.arrival_time();
                    let arrival = departure.saturating_add(edge.duration);
                    let trip_idx = self.arena.push(TransferTrip {
                        from_stop: stop,
                        to_stop: edge.to,
                        dep_time: departure,
                        arr_time: arrival,
                        transport_type: edge.mode,
                        distance_km: self.timetable.stop_distance_km(stop, edge.to),
                    });
                    let data = LabelUpdate {
                        boarding_stop: stop,
                        arrival_stop: edge.to,
                        old_trip: label.trip(),
                        new_trip: TripRef::Transfer(trip_idx),
                        ctx: TripCtx {
                            timetable: self.timetable,
                            arena: &self.arena,
                        },
                        best_labels: &self.best,
                    };
                    candidates.add(label.update(&data)?);
                }

                if self.bags[k][edge.to].merge(&candidates) {
                    new_marked.set(edge.to, true);
                    self.refresh_best(k, edge.to);
                }
            }
        }

        Ok(new_marked)
    }

    pub(super) fn is_renting_station(&self, stop: StopId) -> bool {
        self.timetable.stops[stop].is_renting_station()
    }

    pub(super) fn timetable(&self) -> &'a Timetable {
        self.timetable
    }

    fn refresh_best(&mut self, k: usize, stop: StopId) {
        if let Some(best) = self.bags[k][stop].best_label() {
            self.best[stop] = Some(best.clone());
        }
    }
}
