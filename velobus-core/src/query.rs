//! Public query API: resolve the query, run the requested variant, pick the
//! best journey per destination station.

use chrono::Timelike;
use hashbrown::{HashMap, HashSet};
use log::info;

use crate::error::Error;
use crate::model::shared_mobility::SharedMobilityConfig;
use crate::model::timetable::{StopId, Time, Timetable};
use crate::routing::criteria::CriteriaConfig;
use crate::routing::journey::{Journey, reconstruct_journeys};
use crate::routing::labels::RaptorLabel;
use crate::routing::raptor::{
    RaptorRun, SharedMobilityState, earliest_arrival_raptor, mc_raptor, mc_raptor_shared_mob,
};

/// Departure time of a query, either a wall-clock string or raw seconds
/// past midnight.
#[derive(Debug, Clone)]
pub enum DepartureTime {
    /// `HH:MM:SS`.
    Clock(String),
    Seconds(Time),
}

impl DepartureTime {
    pub fn to_seconds(&self) -> Result<Time, Error> {
        match self {
            DepartureTime::Seconds(secs) => Ok(*secs),
            DepartureTime::Clock(text) => {
                let parsed = chrono::NaiveTime::parse_from_str(text, "%H:%M:%S")
                    .map_err(|_| Error::InvalidDepartureTime(text.clone()))?;
                Ok(parsed.num_seconds_from_midnight())
            }
        }
    }
}

/// One (origin, departure time) query with a round budget.
#[derive(Debug, Clone)]
pub struct QueryInput {
    /// Name of the station to depart from.
    pub origin_station: String,
    pub departure: DepartureTime,
    /// Maximum number of boardings; must be at least 1.
    pub rounds: usize,
}

/// Earliest-arrival RAPTOR: one journey per reachable destination station.
pub fn run_earliest_arrival(
    timetable: &Timetable,
    input: &QueryInput,
) -> Result<HashMap<String, Journey>, Error> {
    let (origins, dep_secs) = resolve_input(timetable, input)?;
    let run = earliest_arrival_raptor(timetable, &origins, dep_secs, input.rounds)?;
    collect_journeys(timetable, &run, &origins, dep_secs, &input.origin_station)
}

/// Multi-criteria McRAPTOR: the lowest-total-cost journey per reachable
/// destination station.
pub fn run_mc(
    timetable: &Timetable,
    input: &QueryInput,
    criteria: &CriteriaConfig,
) -> Result<HashMap<String, Journey>, Error> {
    criteria.validate()?;
    let (origins, dep_secs) = resolve_input(timetable, input)?;
    let run = mc_raptor(timetable, &origins, dep_secs, input.rounds, criteria)?;
    collect_journeys(timetable, &run, &origins, dep_secs, &input.origin_station)
}

/// Multi-criteria McRAPTOR with the shared-mobility overlay enabled.
pub fn run_mc_shared_mob(
    timetable: &Timetable,
    input: &QueryInput,
    criteria: &CriteriaConfig,
    sm_config: &SharedMobilityConfig<'_>,
) -> Result<HashMap<String, Journey>, Error> {
    criteria.validate()?;
    let (origins, dep_secs) = resolve_input(timetable, input)?;
    let mut state = SharedMobilityState::initialize(timetable, sm_config);
    let run = mc_raptor_shared_mob(
        timetable,
        &origins,
        dep_secs,
        input.rounds,
        criteria,
        &mut state,
    )?;
    collect_journeys(timetable, &run, &origins, dep_secs, &input.origin_station)
}

fn resolve_input(timetable: &Timetable, input: &QueryInput) -> Result<(Vec<StopId>, Time), Error> {
    if input.rounds < 1 {
        return Err(Error::InvalidRounds);
    }
    let dep_secs = input.departure.to_seconds()?;
    let station = timetable
        .station_by_name(&input.origin_station)
        .ok_or_else(|| Error::UnknownStation(input.origin_station.clone()))?;

    info!(
        "Routing from '{}' at {dep_secs}s over {} rounds",
        input.origin_station, input.rounds
    );
    Ok((station.stops.clone(), dep_secs))
}

/// Reconstructs journeys for every station and keeps the best one each.
/// Unreachable stations and the origin itself are absent from the result.
fn collect_journeys<L: RaptorLabel>(
    timetable: &Timetable,
    run: &RaptorRun<L>,
    origins: &[StopId],
    dep_secs: Time,
    origin_station: &str,
) -> Result<HashMap<String, Journey>, Error> {
    let origin_set: HashSet<StopId> = origins.iter().copied().collect();

    let mut journeys = HashMap::new();
    for station in &timetable.stations {
        if station.name == origin_station {
            continue;
        }
        let options = reconstruct_journeys(&origin_set, &station.stops, run, timetable, dep_secs)?;
        if let Some(best) = select_best(options) {
            journeys.insert(station.name.clone(), best);
        }
    }
    info!("{} destination stations reachable", journeys.len());
    Ok(journeys)
}

/// Weighted-sum selection; ties prefer the earlier arrival, then the shorter
/// journey.
fn select_best(options: Vec<Journey>) -> Option<Journey> {
    options.into_iter().min_by(|a, b| {
        a.total_cost()
            .partial_cmp(&b.total_cost())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.arr().cmp(&b.arr()))
            .then_with(|| a.len().cmp(&b.len()))
    })
}
