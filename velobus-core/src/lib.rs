//! # velobus-core
//!
//! Round-based public transit routing over a static timetable, in three
//! variants sharing one engine skeleton:
//!
//! - earliest-arrival RAPTOR (single criterion);
//! - multi-criteria McRAPTOR with weighted, composable criteria
//!   (arrival time, boardings, distance, CO₂ emissions);
//! - McRAPTOR with a shared-mobility overlay that discovers bike/e-bike/car
//!   transfers between renting stations on the fly, validated against
//!   per-run availability.
//!
//! The timetable is built once from loader output ([`loading`]) and is
//! immutable afterwards; every query gets its own bags, marked sets and
//! transfer-trip arena, so concurrent queries may share one timetable.
//!
//! ```no_run
//! use velobus_core::prelude::*;
//!
//! # fn demo(source: TimetableSource) -> Result<(), Error> {
//! let timetable = build_timetable(source)?;
//! let journeys = run_earliest_arrival(
//!     &timetable,
//!     &QueryInput {
//!         origin_station: "Hertogenbosch ('s)".into(),
//!         departure: DepartureTime::Clock("08:35:00".into()),
//!         rounds: 5,
//!     },
//! )?;
//! if let Some(journey) = journeys.get("Rotterdam Centraal") {
//!     println!("{}", journey.describe());
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loading;
pub mod model;
pub mod output;
pub mod prelude;
pub mod query;
pub mod routing;

#[cfg(test)]
pub(crate) mod testing;

pub use error::Error;
pub use model::timetable::{StopId, Time, Timetable, TransportType};
pub use output::AlgorithmOutput;
pub use query::{DepartureTime, QueryInput};
pub use routing::{CriteriaConfig, Journey, Leg};
