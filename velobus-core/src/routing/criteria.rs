//! Search criteria for the multi-criteria variant.
//!
//! The criterion set is small and closed: arrival time, boardings, travelled
//! distance and CO₂ emissions. Each carries its own update rule, applied
//! whenever a label moves along a trip or boards a new one. Criteria whose
//! value depends on the journey prefix (distance, emissions) read the
//! best-so-far label of the boarding stop through [`LabelUpdate`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::timetable::{StopId, Time};
use crate::routing::RaptorError;
use crate::routing::labels::MultiCriteriaLabel;
use crate::routing::trips::{TripCtx, TripRef};

/// Cost assigned to labels breaching a criterion's upper bound; such labels
/// never enter a bag.
pub const LARGE_COST: f64 = f64::INFINITY;

/// The closed set of supported criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CriterionKind {
    ArrivalTime,
    Transfers,
    Distance,
    Emissions,
}

impl CriterionKind {
    /// Configuration key, matching the JSON weights document.
    pub fn key(self) -> &'static str {
        match self {
            Self::ArrivalTime => "arrival_time",
            Self::Transfers => "transfers",
            Self::Distance => "distance",
            Self::Emissions => "co2",
        }
    }

    fn from_key(key: &str) -> Option<Self> {
        match key {
            "arrival_time" => Some(Self::ArrivalTime),
            "transfers" => Some(Self::Transfers),
            "distance" => Some(Self::Distance),
            "co2" => Some(Self::Emissions),
            _ => None,
        }
    }
}

/// One weighted criterion value of a label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub kind: CriterionKind,
    pub weight: f64,
    /// Value in the criterion's own unit (seconds, boardings, km, grams).
    pub raw_value: f64,
    /// Values above this bound make the label unusable.
    pub upper_bound: f64,
}

impl Criterion {
    /// Weighted cost, with the raw value normalized over `[0, upper_bound]`.
    pub fn cost(&self) -> f64 {
        if self.raw_value > self.upper_bound {
            LARGE_COST
        } else {
            self.weight * (self.raw_value / self.upper_bound)
        }
    }

    fn with_raw(&self, raw_value: f64) -> Criterion {
        Criterion { raw_value, ..*self }
    }

    /// Applies this criterion's update rule for a label move described by
    /// `data`.
    pub(crate) fn update(
        &self,
        data: &LabelUpdate<'_, MultiCriteriaLabel>,
    ) -> Result<Criterion, RaptorError> {
        match self.kind {
            CriterionKind::ArrivalTime => {
                let arrival = data.ctx.arrival_at(data.new_trip, data.arrival_stop)?;
                Ok(self.with_raw(f64::from(arrival)))
            }
            CriterionKind::Transfers => {
                // The first boarding opens the journey and is free; platform
                // changes inside one station are free as well.
                let boards_new_trip = match data.old_trip {
                    Some(old) => old != data.new_trip,
                    None => false,
                };
                let counts = boards_new_trip
                    && !data.ctx.is_same_station_transfer(data.new_trip)?;
                Ok(self.with_raw(if counts {
                    self.raw_value + 1.0
                } else {
                    self.raw_value
                }))
            }
            CriterionKind::Distance => {
                let leg_distance = same_trip_distance(data)?;
                let at_boarding =
                    best_stop_criterion(CriterionKind::Distance, data.boarding_stop, data)?;
                Ok(self.with_raw(at_boarding.raw_value + leg_distance))
            }
            CriterionKind::Emissions => {
                let leg_distance = same_trip_distance(data)?;
                let factor = data.ctx.transport_type(data.new_trip)?.emission_factor();
                let at_boarding =
                    best_stop_criterion(CriterionKind::Emissions, data.boarding_stop, data)?;
                Ok(self.with_raw(at_boarding.raw_value + leg_distance * factor))
            }
        }
    }
}

/// Distance covered by the new trip between the boarding and arrival stops.
fn same_trip_distance(data: &LabelUpdate<'_, MultiCriteriaLabel>) -> Result<f64, RaptorError> {
    let to = data.ctx.cum_distance(data.new_trip, data.arrival_stop)?;
    let from = data.ctx.cum_distance(data.new_trip, data.boarding_stop)?;
    Ok(to - from)
}

/// The criterion of the given kind in the best label of `stop`. Its absence
/// indicates a construction bug and is fatal.
fn best_stop_criterion(
    kind: CriterionKind,
    stop: StopId,
    data: &LabelUpdate<'_, MultiCriteriaLabel>,
) -> Result<Criterion, RaptorError> {
    data.best_labels
        .get(stop)
        .and_then(|slot| slot.as_ref())
        .and_then(|label| label.criterion(kind))
        .ok_or(RaptorError::MissingCriterion(kind.key()))
}

/// Everything needed to move a label to `arrival_stop`, possibly on a new
/// trip boarded at `boarding_stop`. The best-so-far labels are passed
/// explicitly: prefix-dependent criteria read through them.
pub(crate) struct LabelUpdate<'a, L> {
    pub boarding_stop: StopId,
    pub arrival_stop: StopId,
    pub old_trip: Option<TripRef>,
    pub new_trip: TripRef,
    pub ctx: TripCtx<'a>,
    pub best_labels: &'a [Option<L>],
}

/// Weights and upper bounds for the active criteria, in a fixed order shared
/// by every label of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaConfig {
    entries: Vec<Criterion>,
}

impl CriteriaConfig {
    pub fn new() -> Self {
        CriteriaConfig {
            entries: Vec::new(),
        }
    }

    /// Adds or replaces a criterion.
    pub fn with_criterion(mut self, kind: CriterionKind, weight: f64, upper_bound: f64) -> Self {
        self.entries.retain(|c| c.kind != kind);
        self.entries.push(Criterion {
            kind,
            weight,
            raw_value: 0.0,
            upper_bound,
        });
        self
    }

    /// Parses the `{name: {"weight": w, "max": ub}}` configuration document.
    pub fn from_json_str(doc: &str) -> Result<Self, Error> {
        #[derive(Deserialize)]
        struct Entry {
            weight: f64,
            max: f64,
        }

        let parsed: HashMap<String, Entry> = serde_json::from_str(doc)
            .map_err(|e| Error::InvalidData(format!("criteria configuration: {e}")))?;

        let mut config = CriteriaConfig::new();
        // Fixed insertion order regardless of map order.
        for kind in [
            CriterionKind::ArrivalTime,
            CriterionKind::Transfers,
            CriterionKind::Distance,
            CriterionKind::Emissions,
        ] {
            if let Some(entry) = parsed.get(kind.key()) {
                config = config.with_criterion(kind, entry.weight, entry.max);
            }
        }
        for key in parsed.keys() {
            if CriterionKind::from_key(key).is_none() {
                return Err(Error::InvalidData(format!("unknown criterion '{key}'")));
            }
        }
        Ok(config)
    }

    /// Fails unless the configuration can drive a search: at least the
    /// arrival-time criterion must be present.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if !self.entries.iter().any(|c| c.kind == CriterionKind::ArrivalTime) {
            return Err(Error::InvalidData(
                "criteria configuration lacks the arrival_time criterion".to_string(),
            ));
        }
        Ok(())
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.entries
    }

    /// Criteria seeded for an origin label departing at `dep_secs`.
    pub(crate) fn initial_criteria(&self, dep_secs: Time) -> Vec<Criterion> {
        self.entries
            .iter()
            .map(|c| match c.kind {
                CriterionKind::ArrivalTime => c.with_raw(f64::from(dep_secs)),
                _ => c.with_raw(0.0),
            })
            .collect()
    }
}

impl Default for CriteriaConfig {
    /// All four criteria with unit weights on arrival time and emissions and
    /// half weights on boardings and distance, bounded generously.
    fn default() -> Self {
        CriteriaConfig::new()
            .with_criterion(CriterionKind::ArrivalTime, 1.0, f64::from(2 * 86_400))
            .with_criterion(CriterionKind::Transfers, 0.5, 24.0)
            .with_criterion(CriterionKind::Distance, 0.5, 500.0)
            .with_criterion(CriterionKind::Emissions, 1.0, 50_000.0)
    }
}
