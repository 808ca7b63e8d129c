//! Journeys, legs and the back-walk that assembles them from round bags.

use hashbrown::HashSet;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::model::timetable::{StopId, Time, Timetable, TransportType};
use crate::routing::RaptorError;
use crate::routing::criteria::{Criterion, CriterionKind};
use crate::routing::labels::{Bag, RaptorLabel, pareto_set};
use crate::routing::raptor::engine::RaptorRun;
use crate::routing::trips::TripCtx;

/// One movement of a journey: a ride on a scheduled trip, or a walk/vehicle
/// transfer recorded as a synthetic trip. Fully materialized, so journeys
/// outlive the run that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub from_stop_id: String,
    pub from_stop_name: String,
    pub from_station: String,
    pub from_platform: Option<String>,
    pub to_stop_id: String,
    pub to_stop_name: String,
    pub to_station: String,
    pub to_platform: Option<String>,
    pub departure_time: Time,
    pub arrival_time: Time,
    pub transport_type: TransportType,
    pub route_name: String,
    pub trip_id: String,
    /// Criteria values accumulated up to the end of this leg.
    pub criteria: Vec<Criterion>,
}

/// An ordered list of legs from origin to destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journey {
    /// Requested departure time; the arrival of an empty (origin equals
    /// destination) journey.
    pub departure_secs: Time,
    pub legs: Vec<Leg>,
}

impl Journey {
    pub fn len(&self) -> usize {
        self.legs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Departure time of the first leg.
    pub fn dep(&self) -> Time {
        self.legs
            .first()
            .map_or(self.departure_secs, |leg| leg.departure_time)
    }

    /// Arrival time of the last leg.
    pub fn arr(&self) -> Time {
        self.legs
            .last()
            .map_or(self.departure_secs, |leg| leg.arrival_time)
    }

    pub fn travel_time(&self) -> Time {
        self.arr() - self.dep()
    }

    /// Final criteria of the journey: those of its last leg.
    pub fn criteria(&self) -> &[Criterion] {
        self.legs.last().map_or(&[], |leg| leg.criteria.as_slice())
    }

    /// Weighted-sum cost, used to compare journeys to the same destination.
    pub fn total_cost(&self) -> f64 {
        self.criteria().iter().map(Criterion::cost).sum()
    }

    /// Number of distinct trips used.
    pub fn number_of_trips(&self) -> usize {
        let trips: HashSet<&str> = self.legs.iter().map(|leg| leg.trip_id.as_str()).collect();
        trips.len()
    }

    /// Weighted-sum dominance over another journey.
    pub fn dominates(&self, other: &Journey) -> bool {
        self.total_cost() <= other.total_cost() && self != other
    }

    /// Human-readable leg-by-leg summary.
    pub fn describe(&self) -> String {
        if self.legs.is_empty() {
            return "Journey: already at destination\n".to_string();
        }

        let mut out = String::from("Journey:\n");
        for leg in &self.legs {
            out.push_str(&format!(
                "{} {:20} (p. {:>3}) TO {} {:20} (p. {:>3}) WITH {}\n",
                sec_to_hms(leg.departure_time),
                leg.from_station,
                leg.from_platform.as_deref().unwrap_or("-"),
                sec_to_hms(leg.arrival_time),
                leg.to_station,
                leg.to_platform.as_deref().unwrap_or("-"),
                leg.route_name,
            ));
        }
        for criterion in self.criteria() {
            out.push_str(&describe_criterion(criterion));
            out.push('\n');
        }
        out.push_str(&format!("Duration: {}\n", sec_to_hms(self.travel_time())));
        out
    }
}

fn describe_criterion(criterion: &Criterion) -> String {
    match criterion.kind {
        CriterionKind::ArrivalTime => {
            format!("Arrival Time: {}", sec_to_hms(criterion.raw_value as Time))
        }
        CriterionKind::Transfers => format!("Total Boardings: {}", criterion.raw_value as u64),
        CriterionKind::Distance => {
            format!("Travelled Distance: {:.2} km", criterion.raw_value)
        }
        CriterionKind::Emissions => {
            format!("Total Emissions: {:.1} g CO2/passenger", criterion.raw_value)
        }
    }
}

/// Formats seconds past midnight as `HH:MM:SS`; hours may exceed 23 for
/// times past midnight of the service date.
pub(crate) fn sec_to_hms(secs: Time) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    )
}

/// Journey prefix under construction: legs still carry their labels.
#[derive(Debug, Clone)]
struct PartialLeg<L> {
    from: StopId,
    to: StopId,
    label: L,
}

/// Builds every valid Pareto-optimal journey from the origin stops to the
/// given destination stops by back-walking the final round's bags.
pub(crate) fn reconstruct_journeys<L: RaptorLabel>(
    origin_stops: &HashSet<StopId>,
    destination_stops: &[StopId],
    run: &RaptorRun<L>,
    timetable: &Timetable,
    departure_secs: Time,
) -> Result<Vec<Journey>, RaptorError> {
    let bags = run.final_bags();
    let ctx = TripCtx {
        timetable,
        arena: &run.arena,
    };

    // Non-dominated (stop, label) pairs over all destination stops. Labels
    // without a trip only exist at origin stops, where they stand for the
    // zero-leg journey.
    let mut candidates: Vec<(StopId, L)> = Vec::new();
    for &stop in destination_stops {
        if origin_stops.contains(&stop) {
            for label in bags[stop].labels() {
                candidates.push((stop, label.clone()));
            }
        } else {
            for label in bags[stop].labels_with_trip() {
                candidates.push((stop, label.clone()));
            }
        }
    }
    let front = pareto_set(
        &candidates.iter().map(|(_, l)| l.clone()).collect::<Vec<_>>(),
        false,
    );
    let survivors: Vec<(StopId, L)> = candidates
        .into_iter()
        .filter(|(_, label)| front.contains(label))
        .collect();

    // Legitimate journeys cannot have more legs than two per round plus the
    // terminal one; longer chains are degenerate and cut off.
    let max_legs = 2 * run.actual_rounds + 3;

    let mut journeys = Vec::new();
    for (stop, label) in survivors {
        let terminal = PartialLeg {
            from: label.boarding_stop(),
            to: stop,
            label,
        };
        walk_back(
            &mut journeys,
            vec![terminal],
            origin_stops,
            bags,
            ctx,
            departure_secs,
            max_legs,
        )?;
    }
    debug!(
        "Reconstructed {} valid journeys to {} destination stops",
        journeys.len(),
        destination_stops.len()
    );
    Ok(journeys)
}

/// Recursively prepends compatible predecessor legs until an origin stop or
/// a trip-less label is reached, then validates and materializes.
fn walk_back<L: RaptorLabel>(
    journeys: &mut Vec<Journey>,
    legs: Vec<PartialLeg<L>>,
    origin_stops: &HashSet<StopId>,
    bags: &[Bag<L>],
    ctx: TripCtx<'_>,
    departure_secs: Time,
    max_legs: usize,
) -> Result<(), RaptorError> {
    let first = &legs[0];
    if first.label.trip().is_none() || origin_stops.contains(&first.from) {
        if let Some(journey) = finalize(&legs, ctx, departure_secs)? {
            journeys.push(journey);
        }
        return Ok(());
    }
    if legs.len() >= max_legs {
        return Ok(());
    }

    for previous in bags[first.from].labels() {
        if !is_compatible_before(previous, &first.label) {
            continue;
        }
        let mut extended = Vec::with_capacity(legs.len() + 1);
        extended.push(PartialLeg {
            from: previous.boarding_stop(),
            to: first.from,
            label: previous.clone(),
        });
        extended.extend(legs.iter().cloned());
        walk_back(
            journeys,
            extended,
            origin_stops,
            bags,
            ctx,
            departure_secs,
            max_legs,
        )?;
    }
    Ok(())
}

/// A predecessor label is compatible with the leg it feeds if none of its
/// criteria exceed the successor's, and it makes strict progress: a label
/// identical in trip and boarding stop would only replay the same movement.
fn is_compatible_before<L: RaptorLabel>(previous: &L, current: &L) -> bool {
    let progress = previous.trip() != current.trip()
        || previous.boarding_stop() != current.boarding_stop();
    progress
        && previous
            .criteria()
            .iter()
            .zip(current.criteria())
            .all(|(p, c)| p.raw_value <= c.raw_value)
}

/// Drops empty and same-station transfer legs, validates the leg chain and
/// materializes the journey.
fn finalize<L: RaptorLabel>(
    legs: &[PartialLeg<L>],
    ctx: TripCtx<'_>,
    departure_secs: Time,
) -> Result<Option<Journey>, RaptorError> {
    let mut kept = Vec::with_capacity(legs.len());
    for leg in legs {
        let Some(trip) = leg.label.trip() else {
            continue;
        };
        if ctx.is_same_station_transfer(trip)? {
            continue;
        }
        kept.push((leg, trip));
    }

    // Each leg must end no later than the next one starts.
    for ((leg, trip), (next_leg, next_trip)) in kept.iter().tuple_windows() {
        let arrival = ctx.arrival_at(*trip, leg.to)?;
        let next_departure = ctx.departure_at(*next_trip, next_leg.from)?;
        if arrival > next_departure {
            return Ok(None);
        }
    }

    let mut materialized = Vec::with_capacity(kept.len());
    for (leg, trip) in kept {
        let stops = &ctx.timetable.stops;
        let stations = &ctx.timetable.stations;
        let (from, to) = (&stops[leg.from], &stops[leg.to]);
        let route_info = ctx.route_info(trip)?;
        materialized.push(Leg {
            from_stop_id: from.id.clone(),
            from_stop_name: from.name.clone(),
            from_station: stations[from.station].name.clone(),
            from_platform: from.platform_code.clone(),
            to_stop_id: to.id.clone(),
            to_stop_name: to.name.clone(),
            to_station: stations[to.station].name.clone(),
            to_platform: to.platform_code.clone(),
            departure_time: ctx.departure_at(trip, leg.from)?,
            arrival_time: ctx.arrival_at(trip, leg.to)?,
            transport_type: route_info.transport_type,
            route_name: route_info.name,
            trip_id: ctx.trip_display_id(trip)?,
            criteria: leg.label.criteria(),
        });
    }

    Ok(Some(Journey {
        departure_secs,
        legs: materialized,
    }))
}
