//! Shared fixtures for unit tests.

use crate::loading::{
    SourceStation, SourceStop, SourceStopTime, SourceTrip, TimetableSource, build_timetable,
};
use crate::model::timetable::{StopId, Time, Timetable, TransportType};
use crate::routing::criteria::CriteriaConfig;

/// Station names of the line fixture, west to east.
pub(crate) const LINE_STATIONS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// Hop time between adjacent stations on the fixture line.
pub(crate) const HOP_SECS: Time = 600;

/// Six stations A–F with one platform each and a single rail trip
/// A→B→C→D→E→F departing at 08:00 with 10-minute hops (arrival at F at
/// 08:50). Adjacent stations are ~2 km apart.
pub(crate) fn single_line_timetable() -> Timetable {
    build_timetable(single_line_source()).unwrap()
}

pub(crate) fn single_line_source() -> TimetableSource {
    let stations = LINE_STATIONS
        .iter()
        .map(|&name| SourceStation {
            id: name.to_string(),
            name: name.to_string(),
        })
        .collect();
    let stops = LINE_STATIONS
        .iter()
        .enumerate()
        .map(|(i, &name)| SourceStop {
            id: format!("{name}1"),
            name: format!("{name} platform 1"),
            station_id: name.to_string(),
            platform_code: Some("1".to_string()),
            lat: 45.0,
            lon: 9.0 + 0.0256 * i as f64,
        })
        .collect();

    TimetableSource {
        date: Some("20260801".to_string()),
        stations,
        stops,
        trips: vec![line_trip("line-0800", 8 * 3600, HOP_SECS)],
        transfers: Vec::new(),
        ..TimetableSource::default()
    }
}

/// A trip over all six fixture stations with the given departure at A and
/// constant hop time, 2 km per hop.
pub(crate) fn line_trip(id: &str, dep_at_a: Time, hop: Time) -> SourceTrip {
    SourceTrip {
        id: id.to_string(),
        route_name: "Line 1".to_string(),
        transport_type: TransportType::Rail,
        stop_times: LINE_STATIONS
            .iter()
            .enumerate()
            .map(|(i, &name)| {
                let time = dep_at_a + hop * i as Time;
                SourceStopTime {
                    stop_id: format!("{name}1"),
                    arrival: time,
                    departure: time,
                    travelled_distance: 2.0 * i as f64,
                }
            })
            .collect(),
    }
}

/// Two stations X and Y, 10 km apart, linked by a fast bus (arriving 08:30)
/// and a slower rail connection (arriving 08:45) on separate platforms.
pub(crate) fn bus_and_rail_source() -> TimetableSource {
    let mut source = TimetableSource {
        date: Some("20260801".to_string()),
        stations: vec![
            SourceStation {
                id: "X".to_string(),
                name: "X".to_string(),
            },
            SourceStation {
                id: "Y".to_string(),
                name: "Y".to_string(),
            },
        ],
        ..TimetableSource::default()
    };
    for (station, platform, lon) in
        [("X", 1, 9.0), ("X", 2, 9.0), ("Y", 1, 9.128), ("Y", 2, 9.128)]
    {
        source.stops.push(SourceStop {
            id: format!("{station}{platform}"),
            name: format!("{station} platform {platform}"),
            station_id: station.to_string(),
            platform_code: Some(platform.to_string()),
            lat: 45.0,
            lon,
        });
    }
    let direct = |id: &str, from: &str, to: &str, mode, arr: Time| SourceTrip {
        id: id.to_string(),
        route_name: id.to_string(),
        transport_type: mode,
        stop_times: vec![
            SourceStopTime {
                stop_id: from.to_string(),
                arrival: 8 * 3600,
                departure: 8 * 3600,
                travelled_distance: 0.0,
            },
            SourceStopTime {
                stop_id: to.to_string(),
                arrival: arr,
                departure: arr,
                travelled_distance: 10.0,
            },
        ],
    };
    source
        .trips
        .push(direct("bus", "X1", "Y1", TransportType::Bus, 8 * 3600 + 1800));
    source
        .trips
        .push(direct("rail", "X2", "Y2", TransportType::Rail, 8 * 3600 + 2700));
    source
}

/// First stop of the named station.
pub(crate) fn stop_of(timetable: &Timetable, station: &str) -> StopId {
    timetable.station_by_name(station).unwrap().stops[0]
}

/// The four standard criteria with the default weights.
pub(crate) fn mc_config() -> CriteriaConfig {
    CriteriaConfig::default()
}
