//! Multi-criteria McRAPTOR, with and without the shared-mobility overlay.

use crate::model::timetable::{StopId, Time, Timetable};
use crate::routing::RaptorError;
use crate::routing::criteria::CriteriaConfig;
use crate::routing::labels::MultiCriteriaLabel;
use crate::routing::raptor::engine::{RaptorRun, RoundEngine};
use crate::routing::raptor::shared_mob::SharedMobilityState;

/// Runs the multi-criteria variant from the given origin stops.
pub(crate) fn mc_raptor(
    timetable: &Timetable,
    from_stops: &[StopId],
    dep_secs: Time,
    rounds: usize,
    criteria: &CriteriaConfig,
) -> Result<RaptorRun<MultiCriteriaLabel>, RaptorError> {
    RoundEngine::new(timetable).run(
        from_stops,
        rounds,
        |stop| MultiCriteriaLabel::departure(stop, criteria.initial_criteria(dep_secs)),
        None,
        |_| true,
    )
}

/// Runs the multi-criteria variant with the shared-mobility overlay active.
pub(crate) fn mc_raptor_shared_mob(
    timetable: &Timetable,
    from_stops: &[StopId],
    dep_secs: Time,
    rounds: usize,
    criteria: &CriteriaConfig,
    state: &mut SharedMobilityState,
) -> Result<RaptorRun<MultiCriteriaLabel>, RaptorError> {
    RoundEngine::new(timetable).run(
        from_stops,
        rounds,
        |stop| MultiCriteriaLabel::departure(stop, criteria.initial_criteria(dep_secs)),
        Some(state),
        |_| true,
    )
}
