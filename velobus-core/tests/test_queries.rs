//! Query scenarios over a small in-memory network: six stations A–F on one
//! rail line departing A at 08:00 with 10-minute hops.

use velobus_core::prelude::*;

const H8: Time = 8 * 3600;
const HOP: Time = 600;
const STATIONS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// ~2 km of longitude at latitude 45.
const LON_STEP: f64 = 0.0256;

fn line_trip(id: &str, names: &[&str], dep: Time, hop: Time, km_per_hop: f64) -> SourceTrip {
    SourceTrip {
        id: id.to_string(),
        route_name: format!("Line {id}"),
        transport_type: TransportType::Rail,
        stop_times: names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let t = dep + hop * i as Time;
                SourceStopTime {
                    stop_id: format!("{name}1"),
                    arrival: t,
                    departure: t,
                    travelled_distance: km_per_hop * i as f64,
                }
            })
            .collect(),
    }
}

fn base_source() -> TimetableSource {
    TimetableSource {
        date: Some("20260801".to_string()),
        stations: STATIONS
            .iter()
            .map(|&name| SourceStation {
                id: name.to_string(),
                name: name.to_string(),
            })
            .collect(),
        stops: STATIONS
            .iter()
            .enumerate()
            .map(|(i, &name)| SourceStop {
                id: format!("{name}1"),
                name: format!("{name} platform 1"),
                station_id: name.to_string(),
                platform_code: Some("1".to_string()),
                lat: 45.0,
                lon: 9.0 + LON_STEP * i as f64,
            })
            .collect(),
        trips: vec![line_trip("0800", &STATIONS, H8, HOP, 2.0)],
        transfers: Vec::new(),
        ..TimetableSource::default()
    }
}

fn query(origin: &str, departure: &str, rounds: usize) -> QueryInput {
    QueryInput {
        origin_station: origin.to_string(),
        departure: DepartureTime::Clock(departure.to_string()),
        rounds,
    }
}

#[test]
fn test_direct_line_reaches_every_station() {
    let timetable = build_timetable(base_source()).unwrap();
    let journeys = run_earliest_arrival(&timetable, &query("A", "08:00:00", 4)).unwrap();

    let to_f = &journeys["F"];
    assert_eq!(to_f.len(), 1, "one trip means one leg");
    assert_eq!(to_f.arr(), H8 + 50 * 60);
    assert_eq!(to_f.dep(), H8);
    assert_eq!(to_f.number_of_trips(), 1);

    // Every downstream station is reachable, the origin is not reported.
    for name in &STATIONS[1..] {
        assert!(journeys.contains_key(*name));
    }
    assert!(!journeys.contains_key("A"));
}

#[test]
fn test_one_round_suffices_for_one_boarding() {
    let timetable = build_timetable(base_source()).unwrap();
    let journeys = run_earliest_arrival(&timetable, &query("A", "08:00:00", 1)).unwrap();
    assert_eq!(journeys["F"].arr(), H8 + 50 * 60);
}

#[test]
fn test_boardings_stay_zero_on_a_single_trip() {
    let timetable = build_timetable(base_source()).unwrap();
    let criteria = CriteriaConfig::default();
    let journeys = run_mc(&timetable, &query("A", "08:00:00", 4), &criteria).unwrap();

    let to_f = &journeys["F"];
    let boardings = to_f
        .criteria()
        .iter()
        .find(|c| c.kind == CriterionKind::Transfers)
        .unwrap();
    assert_eq!(boardings.raw_value, 0.0);
    assert_eq!(to_f.arr(), H8 + 50 * 60);
}

/// A walking transfer B↔C of 120 s plus a faster parallel line C→D→E→F
/// departing 08:12: two rounds produce the three-leg journey with the walk
/// in the middle.
#[test]
fn test_walking_transfer_to_a_faster_line() {
    let mut source = base_source();
    source.transfers.push(SourceTransfer {
        from_stop_id: "B1".to_string(),
        to_stop_id: "C1".to_string(),
        duration: 120,
    });
    // Departs C exactly when the walk arrives; boarding is inclusive.
    source
        .trips
        .push(line_trip("0812", &["C", "D", "E", "F"], H8 + 12 * 60, 480, 2.0));
    let timetable = build_timetable(source).unwrap();

    let journeys = run_earliest_arrival(&timetable, &query("A", "08:00:00", 2)).unwrap();
    let to_f = &journeys["F"];

    assert_eq!(to_f.len(), 3);
    assert_eq!(to_f.arr(), H8 + 36 * 60);

    let walk = &to_f.legs[1];
    assert_eq!(walk.transport_type, TransportType::Walk);
    assert_eq!(walk.from_station, "B");
    assert_eq!(walk.to_station, "C");
    assert_eq!(walk.arrival_time - walk.departure_time, 120);
}

/// The walk and the second trip each count as a boarding under the
/// multi-criteria variant; the initial boarding is free.
#[test]
fn test_boardings_count_walks_and_trip_changes() {
    let mut source = base_source();
    source.transfers.push(SourceTransfer {
        from_stop_id: "B1".to_string(),
        to_stop_id: "C1".to_string(),
        duration: 120,
    });
    source
        .trips
        .push(line_trip("0812", &["C", "D", "E", "F"], H8 + 12 * 60, 480, 2.0));
    let timetable = build_timetable(source).unwrap();

    let criteria = CriteriaConfig::new()
        .with_criterion(CriterionKind::ArrivalTime, 1.0, 86_400.0)
        .with_criterion(CriterionKind::Transfers, 0.01, 30.0);
    let journeys = run_mc(&timetable, &query("A", "08:00:00", 2), &criteria).unwrap();

    let to_f = &journeys["F"];
    assert_eq!(to_f.arr(), H8 + 36 * 60);
    let boardings = to_f
        .criteria()
        .iter()
        .find(|c| c.kind == CriterionKind::Transfers)
        .unwrap();
    assert_eq!(boardings.raw_value, 2.0);
}

/// A fast, dirty bus against a slower, cleaner rail connection: with these
/// weights the emissions gap outweighs the later arrival.
#[test]
fn test_weighted_sum_picks_the_cleaner_path() {
    let mut source = TimetableSource {
        date: Some("20260801".to_string()),
        stations: vec![
            SourceStation {
                id: "X".into(),
                name: "X".into(),
            },
            SourceStation {
                id: "Y".into(),
                name: "Y".into(),
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
    let direct = |id: &str, from: &str, to: &str, mode, arr, km| SourceTrip {
        id: id.to_string(),
        route_name: id.to_string(),
        transport_type: mode,
        stop_times: vec![
            SourceStopTime {
                stop_id: from.to_string(),
                arrival: H8,
                departure: H8,
                travelled_distance: 0.0,
            },
            SourceStopTime {
                stop_id: to.to_string(),
                arrival: arr,
                departure: arr,
                travelled_distance: km,
            },
        ],
    };
    source.trips.push(direct(
        "bus",
        "X1",
        "Y1",
        TransportType::Bus,
        H8 + 30 * 60,
        10.0,
    ));
    source.trips.push(direct(
        "rail",
        "X2",
        "Y2",
        TransportType::Rail,
        H8 + 45 * 60,
        10.0,
    ));
    let timetable = build_timetable(source).unwrap();

    let criteria = CriteriaConfig::new()
        .with_criterion(CriterionKind::ArrivalTime, 1.0, 86_400.0)
        .with_criterion(CriterionKind::Transfers, 0.5, 10.0)
        .with_criterion(CriterionKind::Distance, 0.5, 100.0)
        .with_criterion(CriterionKind::Emissions, 1.0, 10_000.0);
    let journeys = run_mc(&timetable, &query("X", "08:00:00", 2), &criteria).unwrap();

    let to_y = &journeys["Y"];
    assert_eq!(to_y.legs[0].transport_type, TransportType::Rail);
    assert_eq!(to_y.arr(), H8 + 45 * 60);
}

/// Walking longer than any headway still relaxes; the candidate simply
/// loses to the on-train arrival.
#[test]
fn test_slow_transfers_still_relax() {
    let mut source = base_source();
    source.transfers.push(SourceTransfer {
        from_stop_id: "B1".to_string(),
        to_stop_id: "C1".to_string(),
        duration: 2 * 3600,
    });
    let timetable = build_timetable(source).unwrap();

    let journeys = run_earliest_arrival(&timetable, &query("A", "08:00:00", 2)).unwrap();
    assert_eq!(journeys["C"].arr(), H8 + 20 * 60);
}

#[test]
fn test_output_blob_round_trips_through_disk() {
    let timetable = build_timetable(base_source()).unwrap();
    let journeys = run_earliest_arrival(&timetable, &query("A", "08:00:00", 4)).unwrap();

    let output = AlgorithmOutput::new(&timetable, journeys["F"].clone(), "08:00:00");
    let dir = tempfile::tempdir().unwrap();
    let path = output.save_to_dir(dir.path()).unwrap();
    let restored = AlgorithmOutput::read_from_file(&path).unwrap();
    assert_eq!(restored, output);
    assert_eq!(restored.date.as_deref(), Some("20260801"));
    assert_eq!(restored.journey.describe(), output.journey.describe());
}
