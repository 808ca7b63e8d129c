//! Building the in-memory timetable from loader output.
//!
//! Feed parsing (GTFS files, live GBFS documents) happens outside this
//! crate; this module turns the loader's [`TimetableSource`] into the
//! immutable arenas the round engine queries.

mod builder;
mod source;

pub use builder::{add_shared_mobility, build_timetable};
pub use source::{
    SourceStation, SourceStop, SourceStopTime, SourceTransfer, SourceTrip, TimetableSource,
};
