//! Single-criterion earliest-arrival RAPTOR.

use crate::model::timetable::{StopId, Time, Timetable};
use crate::routing::RaptorError;
use crate::routing::labels::Label;
use crate::routing::raptor::engine::{RaptorRun, RoundEngine};

/// Runs the earliest-arrival variant from the given origin stops.
pub(crate) fn earliest_arrival_raptor(
    timetable: &Timetable,
    from_stops: &[StopId],
    dep_secs: Time,
    rounds: usize,
) -> Result<RaptorRun<Label>, RaptorError> {
    RoundEngine::new(timetable).run(
        from_stops,
        rounds,
        |stop| Label::departure(stop, dep_secs),
        None,
        |_| true,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::labels::RaptorLabel;
    use crate::testing::{single_line_timetable, stop_of};

    #[test]
    fn reaches_every_downstream_stop_in_one_round() {
        let timetable = single_line_timetable();
        let origin = stop_of(&timetable, "A");
        let run = earliest_arrival_raptor(&timetable, &[origin], 8 * 3600, 4).unwrap();

        // One boarding covers the whole line: round 1 already reaches F.
        let f = stop_of(&timetable, "F");
        let bag = &run.bags[1][f];
        assert_eq!(bag.labels().len(), 1);
        assert_eq!(bag.labels()[0].arrival_time, 8 * 3600 + 50 * 60);
    }

    #[test]
    fn zero_rounds_reach_only_the_origin() {
        let timetable = single_line_timetable();
        let origin = stop_of(&timetable, "A");
        let run = earliest_arrival_raptor(&timetable, &[origin], 8 * 3600, 0).unwrap();

        assert_eq!(run.actual_rounds, 0);
        let f = stop_of(&timetable, "F");
        assert!(run.bags[0][f].is_empty());
        assert!(!run.bags[0][origin].is_empty());
    }

    #[test]
    fn arrival_is_monotone_across_rounds() {
        let timetable = single_line_timetable();
        let origin = stop_of(&timetable, "A");
        let run = earliest_arrival_raptor(&timetable, &[origin], 8 * 3600, 3).unwrap();

        for stop in 0..timetable.stops.len() {
            let mut previous = None;
            for round in 0..run.bags.len() {
                let arrival = run.bags[round][stop]
                    .labels()
                    .iter()
                    .map(|l| l.arrival_time())
                    .min();
                if let (Some(prev), Some(cur)) = (previous, arrival) {
                    assert!(cur <= prev, "arrival regressed at stop {stop}");
                }
                if arrival.is_some() {
                    previous = arrival;
                }
            }
        }
    }

    #[test]
    fn departing_exactly_at_first_departure_is_boardable() {
        let timetable = single_line_timetable();
        let origin = stop_of(&timetable, "A");
        // The line departs A at exactly 08:00:00.
        let run = earliest_arrival_raptor(&timetable, &[origin], 8 * 3600, 1).unwrap();
        let b = stop_of(&timetable, "B");
        assert!(!run.bags[1][b].is_empty());
    }
}
