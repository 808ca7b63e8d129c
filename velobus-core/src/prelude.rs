//! Convenience re-exports for typical callers.

pub use crate::error::Error;
pub use crate::loading::{
    SourceStation, SourceStop, SourceStopTime, SourceTransfer, SourceTrip, TimetableSource,
    add_shared_mobility, build_timetable,
};
pub use crate::model::shared_mobility::{
    RentingStationInfo, RentingStationStatus, SharedMobilityConfig, SharedMobilityFeed,
    StaticSharedMobilityFeed,
};
pub use crate::model::timetable::{StopId, Time, Timetable, TransportType};
pub use crate::output::AlgorithmOutput;
pub use crate::query::{
    DepartureTime, QueryInput, run_earliest_arrival, run_mc, run_mc_shared_mob,
};
pub use crate::routing::{CriteriaConfig, Criterion, CriterionKind, Journey, Leg};
