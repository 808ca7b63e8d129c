//! Builds the immutable [`Timetable`] from a [`TimetableSource`] and
//! optionally enriches it with shared-mobility renting stations.

use geo::Point;
use hashbrown::HashMap;
use log::{debug, info, warn};
use rayon::prelude::*;

use super::source::{SourceTrip, TimetableSource};
use crate::error::Error;
use crate::model::shared_mobility::{RentingData, SharedMobilityFeed};
use crate::model::timetable::{
    MEAN_FOOT_SPEED_KMH, Route, Station, Stop, StopId, Time, Timetable, Transfer, Trip,
    TripStopTime,
};

/// Builds a queryable timetable from loader output.
///
/// De-duplicates stations and stops by id, assigns dense indices, groups
/// trips into routes by identical stop-id sequence and wires up the reverse
/// indexes required by the round engine.
///
/// # Errors
///
/// Returns [`Error::InvalidData`] for trips with fewer than two stop times,
/// non-monotonic stop times, or references to unknown stops.
pub fn build_timetable(source: TimetableSource) -> Result<Timetable, Error> {
    info!(
        "Building timetable: {} stations, {} stops, {} trips, {} transfers",
        source.stations.len(),
        source.stops.len(),
        source.trips.len(),
        source.transfers.len()
    );

    let mut timetable = Timetable {
        original_source_dir: source.original_source_dir.clone(),
        date: source.date.clone(),
        ..Timetable::default()
    };

    add_stations_and_stops(&mut timetable, &source)?;
    add_trips(&mut timetable, &source.trips)?;
    group_routes(&mut timetable);

    for transfer in &source.transfers {
        let from = resolve_stop(&timetable, &transfer.from_stop_id)?;
        let to = resolve_stop(&timetable, &transfer.to_stop_id)?;
        push_transfer_pair(&mut timetable, from, to, transfer.duration);
    }
    rebuild_transfer_index(&mut timetable);

    timetable.log_counts();
    Ok(timetable)
}

/// Appends every feed's renting stations to the timetable and connects them
/// to nearby public stops with symmetric walking transfers.
///
/// A feed whose static station list cannot be fetched is skipped with a
/// warning; the remaining feeds are still applied.
pub fn add_shared_mobility(
    timetable: &mut Timetable,
    feeds: &[&dyn SharedMobilityFeed],
    max_walk_km: f64,
) -> Result<(), Error> {
    let public_stops: Vec<StopId> = timetable
        .stops
        .iter()
        .filter(|s| !s.is_renting_station())
        .map(|s| s.index)
        .collect();

    let mut new_stops: Vec<StopId> = Vec::new();
    for feed in feeds {
        let stations = match feed.stations() {
            Ok(stations) => stations,
            Err(err) => {
                warn!(
                    "Skipping shared mobility feed '{}': {err}",
                    feed.system_id()
                );
                continue;
            }
        };

        let before = timetable.stops.len();
        for info in stations {
            if timetable.stop_by_source_id.contains_key(&info.station_id) {
                continue;
            }

            let station_idx = timetable.stations.len();
            timetable.stations.push(Station {
                id: info.station_id.clone(),
                name: info.name.clone(),
                stops: vec![timetable.stops.len()],
            });
            timetable
                .station_by_name
                .entry(info.name.clone())
                .or_insert(station_idx);

            let stop_idx = timetable.stops.len();
            timetable.stops.push(Stop {
                id: info.station_id.clone(),
                name: info.name,
                station: station_idx,
                platform_code: None,
                index: stop_idx,
                location: Point::new(info.lon, info.lat),
                renting: Some(RentingData {
                    system_id: feed.system_id().to_string(),
                    transport_types: feed.transport_types().to_vec(),
                    capacity: info.capacity,
                }),
            });
            timetable.stop_by_source_id.insert(info.station_id, stop_idx);
            timetable.stop_routes.push(Vec::new());
            new_stops.push(stop_idx);
        }
        debug!(
            "Added {} renting stations from '{}'",
            timetable.stops.len() - before,
            feed.system_id()
        );
    }

    // Walking links between each new renting station and every public stop
    // within reach.
    let stops: &[Stop] = &timetable.stops;
    let reachable: Vec<(StopId, StopId, Time)> = new_stops
        .par_iter()
        .flat_map_iter(|&renting| {
            public_stops.iter().filter_map(move |&public| {
                let distance = stops[renting].distance_km(&stops[public]);
                if distance < max_walk_km {
                    Some((renting, public, walk_duration(distance)))
                } else {
                    None
                }
            })
        })
        .collect();

    debug!(
        "Added {} walking links to renting stations",
        reachable.len() * 2
    );
    for (renting, public, duration) in reachable {
        push_transfer_pair(timetable, renting, public, duration);
    }
    rebuild_transfer_index(timetable);
    Ok(())
}

/// Walking time over a great-circle distance, rounded up.
pub(crate) fn walk_duration(distance_km: f64) -> Time {
    (3600.0 * distance_km / MEAN_FOOT_SPEED_KMH).ceil() as Time
}

fn add_stations_and_stops(
    timetable: &mut Timetable,
    source: &TimetableSource,
) -> Result<(), Error> {
    let mut station_ids: HashMap<String, usize> = HashMap::new();

    for station in &source.stations {
        if station_ids.contains_key(&station.id) {
            continue;
        }
        let idx = timetable.stations.len();
        station_ids.insert(station.id.clone(), idx);
        timetable
            .station_by_name
            .entry(station.name.clone())
            .or_insert(idx);
        timetable.stations.push(Station {
            id: station.id.clone(),
            name: station.name.clone(),
            stops: Vec::new(),
        });
    }

    for stop in &source.stops {
        if timetable.stop_by_source_id.contains_key(&stop.id) {
            continue;
        }
        let station = *station_ids.get(&stop.station_id).ok_or_else(|| {
            Error::InvalidData(format!(
                "stop '{}' references unknown station '{}'",
                stop.id, stop.station_id
            ))
        })?;

        let idx = timetable.stops.len();
        timetable.stop_by_source_id.insert(stop.id.clone(), idx);
        timetable.stations[station].stops.push(idx);
        timetable.stops.push(Stop {
            id: stop.id.clone(),
            name: stop.name.clone(),
            station,
            platform_code: stop.platform_code.clone(),
            index: idx,
            location: Point::new(stop.lon, stop.lat),
            renting: None,
        });
        timetable.stop_routes.push(Vec::new());
    }
    Ok(())
}

fn add_trips(timetable: &mut Timetable, trips: &[SourceTrip]) -> Result<(), Error> {
    // Validation and stop resolution are independent per trip; the arena
    // index is the trip's position, so the parallel collect keeps ids stable.
    let shared: &Timetable = timetable;
    let built: Result<Vec<Trip>, Error> = trips
        .par_iter()
        .enumerate()
        .map(|(index, trip)| build_trip(shared, index, trip))
        .collect();
    timetable.trips = built?;
    Ok(())
}

fn build_trip(timetable: &Timetable, index: usize, source: &SourceTrip) -> Result<Trip, Error> {
    if source.stop_times.len() < 2 {
        return Err(Error::InvalidData(format!(
            "trip '{}' has fewer than 2 stop times",
            source.id
        )));
    }

    let mut stop_times = Vec::with_capacity(source.stop_times.len());
    let mut prev_dep: Option<Time> = None;
    for (stop_idx, st) in source.stop_times.iter().enumerate() {
        if st.arrival > st.departure || prev_dep.is_some_and(|dep| dep > st.arrival) {
            return Err(Error::InvalidData(format!(
                "trip '{}' has non-monotonic stop times at sequence {stop_idx}",
                source.id
            )));
        }
        prev_dep = Some(st.departure);

        stop_times.push(TripStopTime {
            stop: resolve_stop(timetable, &st.stop_id)?,
            stop_idx,
            dts_arr: st.arrival,
            dts_dep: st.departure,
            travelled_distance: st.travelled_distance,
        });
    }

    Ok(Trip::new(
        index,
        source.id.clone(),
        crate::model::timetable::RouteInfo {
            transport_type: source.transport_type,
            name: source.route_name.clone(),
        },
        stop_times,
    ))
}

fn group_routes(timetable: &mut Timetable) {
    let mut by_sequence: HashMap<Vec<StopId>, usize> = HashMap::new();

    for trip_id in 0..timetable.trips.len() {
        let sequence = timetable.trips[trip_id].stop_sequence();
        let route_idx = *by_sequence.entry(sequence.clone()).or_insert_with(|| {
            let idx = timetable.routes.len();
            timetable.routes.push(Route::new(idx, sequence));
            idx
        });
        timetable.routes[route_idx].trips.push(trip_id);
    }

    // Stable trip order inside a route: by departure at the first stop, then
    // by arena index.
    for route in &mut timetable.routes {
        route
            .trips
            .sort_by_key(|&t| (timetable.trips[t].stop_times[0].dts_dep, t));
    }

    for route in &timetable.routes {
        for &stop in &route.stops {
            timetable.stop_routes[stop].push(route.index);
        }
    }
    debug!("Grouped {} trips into {} routes", timetable.trips.len(), timetable.routes.len());
}

fn resolve_stop(timetable: &Timetable, id: &str) -> Result<StopId, Error> {
    timetable
        .stop_by_source_id
        .get(id)
        .copied()
        .ok_or_else(|| Error::InvalidData(format!("unknown stop id '{id}'")))
}

/// Registers a transfer in both directions, skipping pairs already present.
fn push_transfer_pair(timetable: &mut Timetable, a: StopId, b: StopId, duration: Time) {
    for (from, to) in [(a, b), (b, a)] {
        if timetable.transfer_pairs.contains_key(&(from, to)) {
            continue;
        }
        timetable
            .transfer_pairs
            .insert((from, to), timetable.transfers.len());
        timetable.transfers.push(Transfer {
            from_stop: from,
            to_stop: to,
            duration,
        });
    }
}

fn rebuild_transfer_index(timetable: &mut Timetable) {
    timetable.transfers_from = vec![Vec::new(); timetable.stops.len()];
    for (idx, transfer) in timetable.transfers.iter().enumerate() {
        timetable.transfers_from[transfer.from_stop].push(idx);
    }
}
