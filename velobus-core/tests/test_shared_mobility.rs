//! Shared-mobility scenarios: the A–F rail line of the query tests plus a
//! bike-sharing system with renting station R1 200 m from B and R2 200 m
//! from F.

use velobus_core::prelude::*;

const H8: Time = 8 * 3600;
const HOP: Time = 600;
const STATIONS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

/// ~2 km of longitude at latitude 45.
const LON_STEP: f64 = 0.0256;

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
        trips: vec![SourceTrip {
            id: "0800".to_string(),
            route_name: "Line 1".to_string(),
            transport_type: TransportType::Rail,
            stop_times: STATIONS
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let t = H8 + HOP * i as Time;
                    SourceStopTime {
                        stop_id: format!("{name}1"),
                        arrival: t,
                        departure: t,
                        travelled_distance: 2.0 * i as f64,
                    }
                })
                .collect(),
        }],
        ..TimetableSource::default()
    }
}

fn bike_feed(r2_returning: bool) -> StaticSharedMobilityFeed {
    let status = |id: &str, returning: bool| RentingStationStatus {
        station_id: id.to_string(),
        is_installed: true,
        is_renting: true,
        is_returning: returning,
        num_docks_available: if returning { 5 } else { 0 },
        num_vehicles_available: 5,
    };
    StaticSharedMobilityFeed {
        system_id: "citybike".to_string(),
        transport_types: vec![TransportType::Bike],
        stations: vec![
            RentingStationInfo {
                station_id: "R1".to_string(),
                name: "R1".to_string(),
                lat: 45.0018,
                lon: 9.0 + LON_STEP,
                capacity: 10,
            },
            RentingStationInfo {
                station_id: "R2".to_string(),
                name: "R2".to_string(),
                lat: 45.0018,
                lon: 9.0 + LON_STEP * 5.0,
                capacity: 10,
            },
        ],
        status: vec![status("R1", true), status("R2", r2_returning)],
    }
}

/// Arrival time, boardings and emissions matter; boardings are cheap enough
/// for the bike detour to pay off.
fn criteria() -> CriteriaConfig {
    CriteriaConfig::new()
        .with_criterion(CriterionKind::ArrivalTime, 1.0, 86_400.0)
        .with_criterion(CriterionKind::Transfers, 0.1, 30.0)
        .with_criterion(CriterionKind::Distance, 0.1, 500.0)
        .with_criterion(CriterionKind::Emissions, 1.0, 50_000.0)
}

fn query(rounds: usize) -> QueryInput {
    QueryInput {
        origin_station: "A".to_string(),
        departure: DepartureTime::Clock("08:00:00".to_string()),
        rounds,
    }
}

/// The bike leg beats staying on the train: train to B, walk to R1, ride to
/// R2, walk to F.
#[test]
fn test_bike_shortcut_beats_the_train() {
    let mut timetable = build_timetable(base_source()).unwrap();
    let feed = bike_feed(true);
    add_shared_mobility(&mut timetable, &[&feed], 0.5).unwrap();

    let sm_config = SharedMobilityConfig {
        feeds: vec![&feed],
        preferred_vehicle: TransportType::Bike,
        enable_car: false,
    };
    let journeys = run_mc_shared_mob(&timetable, &query(3), &criteria(), &sm_config).unwrap();

    let to_f = &journeys["F"];
    assert!(to_f.arr() < H8 + 50 * 60, "bike journey should be faster");
    assert_eq!(to_f.len(), 4);

    let kinds: Vec<TransportType> = to_f.legs.iter().map(|l| l.transport_type).collect();
    assert_eq!(
        kinds,
        vec![
            TransportType::Rail,
            TransportType::Walk,
            TransportType::Bike,
            TransportType::Walk,
        ]
    );
    assert_eq!(to_f.legs[1].to_station, "R1");
    assert_eq!(to_f.legs[2].from_station, "R1");
    assert_eq!(to_f.legs[2].to_station, "R2");
}

/// With R2 refusing returns the bike edge is never generated and the train
/// journey wins again.
#[test]
fn test_full_docks_suppress_the_bike_journey() {
    let mut timetable = build_timetable(base_source()).unwrap();
    let feed = bike_feed(false);
    add_shared_mobility(&mut timetable, &[&feed], 0.5).unwrap();

    let sm_config = SharedMobilityConfig {
        feeds: vec![&feed],
        preferred_vehicle: TransportType::Bike,
        enable_car: false,
    };
    let journeys = run_mc_shared_mob(&timetable, &query(3), &criteria(), &sm_config).unwrap();

    let to_f = &journeys["F"];
    assert_eq!(to_f.arr(), H8 + 50 * 60);
    assert!(
        to_f.legs
            .iter()
            .all(|l| l.transport_type != TransportType::Bike)
    );
}

/// Byte-for-byte reproducibility of the serialized outputs across runs.
#[test]
fn test_repeated_runs_serialize_identically() {
    let mut timetable = build_timetable(base_source()).unwrap();
    let feed = bike_feed(true);
    add_shared_mobility(&mut timetable, &[&feed], 0.5).unwrap();
    let sm_config = SharedMobilityConfig {
        feeds: vec![&feed],
        preferred_vehicle: TransportType::Bike,
        enable_car: false,
    };

    let mut blobs: Vec<Vec<u8>> = Vec::new();
    for _ in 0..2 {
        let journeys =
            run_mc_shared_mob(&timetable, &query(3), &criteria(), &sm_config).unwrap();

        let mut names: Vec<&String> = journeys.keys().collect();
        names.sort();
        let mut bytes = Vec::new();
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            let output =
                AlgorithmOutput::new(&timetable, journeys[name.as_str()].clone(), "08:00:00");
            let path = output.save_to_dir(dir.path().join(name)).unwrap();
            bytes.extend(std::fs::read(path).unwrap());
        }
        blobs.push(bytes);
    }
    assert_eq!(blobs[0], blobs[1]);
}

/// A feed that fails at availability-refresh time is excluded: its stations
/// become unusable for the run, but the query itself still succeeds.
#[test]
fn test_unavailable_feed_degrades_to_transit_only() {
    let mut timetable = build_timetable(base_source()).unwrap();
    let feed = bike_feed(true);
    add_shared_mobility(&mut timetable, &[&feed], 0.5).unwrap();

    // Same system id, but no status for any station.
    let broken = StaticSharedMobilityFeed {
        status: Vec::new(),
        ..bike_feed(true)
    };
    let sm_config = SharedMobilityConfig {
        feeds: vec![&broken],
        preferred_vehicle: TransportType::Bike,
        enable_car: false,
    };
    let journeys = run_mc_shared_mob(&timetable, &query(3), &criteria(), &sm_config).unwrap();
    assert_eq!(journeys["F"].arr(), H8 + 50 * 60);
}
