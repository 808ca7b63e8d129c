//! Labels and Pareto bags.
//!
//! The engine is generic over the label type: the single-criterion variant
//! tracks earliest arrival only, the multi-criteria variant carries the full
//! criteria vector. Both share the bag machinery, which keeps a per-stop
//! antichain under componentwise dominance.

use crate::model::timetable::{StopId, Time};
use crate::routing::RaptorError;
use crate::routing::criteria::{Criterion, CriterionKind, LabelUpdate};
use crate::routing::trips::TripRef;

/// Behaviour every RAPTOR label must provide. Crate-internal: the public API
/// exposes journeys, not labels.
pub(crate) trait RaptorLabel: Clone + PartialEq + std::fmt::Debug {
    /// Earliest time this label reaches its stop.
    fn arrival_time(&self) -> Time;
    /// Trip used to reach the stop; `None` for origin labels.
    fn trip(&self) -> Option<TripRef>;
    /// Stop where that trip was boarded.
    fn boarding_stop(&self) -> StopId;
    /// Applies the move described by `data`, producing the successor label.
    fn update(&self, data: &LabelUpdate<'_, Self>) -> Result<Self, RaptorError>;
    /// Componentwise weak dominance: not worse on any criterion.
    fn dominates(&self, other: &Self) -> bool;
    /// Weighted-sum cost, used to pick a bag's best label and to compare
    /// final journeys.
    fn total_cost(&self) -> f64;
    /// Criteria snapshot, used by reconstruction and journey output.
    fn criteria(&self) -> Vec<Criterion>;
    /// False once any criterion breached its upper bound; such labels never
    /// enter a bag.
    fn within_bounds(&self) -> bool;
}

/// Label of the earliest-arrival variant.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Label {
    pub arrival_time: Time,
    pub trip: Option<TripRef>,
    pub boarding_stop: StopId,
}

impl Label {
    pub fn departure(stop: StopId, dep_secs: Time) -> Self {
        Label {
            arrival_time: dep_secs,
            trip: None,
            boarding_stop: stop,
        }
    }
}

impl RaptorLabel for Label {
    fn arrival_time(&self) -> Time {
        self.arrival_time
    }

    fn trip(&self) -> Option<TripRef> {
        self.trip
    }

    fn boarding_stop(&self) -> StopId {
        self.boarding_stop
    }

    fn update(&self, data: &LabelUpdate<'_, Self>) -> Result<Self, RaptorError> {
        Ok(Label {
            arrival_time: data.ctx.arrival_at(data.new_trip, data.arrival_stop)?,
            trip: Some(data.new_trip),
            boarding_stop: data.boarding_stop,
        })
    }

    fn dominates(&self, other: &Self) -> bool {
        self.arrival_time <= other.arrival_time
    }

    fn total_cost(&self) -> f64 {
        f64::from(self.arrival_time)
    }

    fn criteria(&self) -> Vec<Criterion> {
        vec![Criterion {
            kind: CriterionKind::ArrivalTime,
            weight: 1.0,
            raw_value: f64::from(self.arrival_time),
            upper_bound: f64::from(Time::MAX),
        }]
    }

    fn within_bounds(&self) -> bool {
        true
    }
}

/// Label of the multi-criteria variant. The criteria vector keeps the fixed
/// order of the run's configuration, so componentwise comparison is
/// positional.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MultiCriteriaLabel {
    pub trip: Option<TripRef>,
    pub boarding_stop: StopId,
    pub criteria: Vec<Criterion>,
}

impl MultiCriteriaLabel {
    pub fn departure(stop: StopId, criteria: Vec<Criterion>) -> Self {
        MultiCriteriaLabel {
            trip: None,
            boarding_stop: stop,
            criteria,
        }
    }

    pub fn criterion(&self, kind: CriterionKind) -> Option<Criterion> {
        self.criteria.iter().copied().find(|c| c.kind == kind)
    }
}

impl RaptorLabel for MultiCriteriaLabel {
    fn arrival_time(&self) -> Time {
        debug_assert!(self.criterion(CriterionKind::ArrivalTime).is_some());
        self.criterion(CriterionKind::ArrivalTime)
            .map_or(Time::MAX, |c| c.raw_value as Time)
    }

    fn trip(&self) -> Option<TripRef> {
        self.trip
    }

    fn boarding_stop(&self) -> StopId {
        self.boarding_stop
    }

    fn update(&self, data: &LabelUpdate<'_, Self>) -> Result<Self, RaptorError> {
        let criteria = self
            .criteria
            .iter()
            .map(|c| c.update(data))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MultiCriteriaLabel {
            trip: Some(data.new_trip),
            boarding_stop: data.boarding_stop,
            criteria,
        })
    }

    fn dominates(&self, other: &Self) -> bool {
        debug_assert_eq!(self.criteria.len(), other.criteria.len());
        self.criteria
            .iter()
            .zip(&other.criteria)
            .all(|(a, b)| a.raw_value <= b.raw_value)
    }

    fn total_cost(&self) -> f64 {
        self.criteria.iter().map(Criterion::cost).sum()
    }

    fn criteria(&self) -> Vec<Criterion> {
        self.criteria.clone()
    }

    fn within_bounds(&self) -> bool {
        self.criteria.iter().all(|c| c.raw_value <= c.upper_bound)
    }
}

/// Multiset of non-dominated labels for one (round, stop).
#[derive(Debug, Clone)]
pub(crate) struct Bag<L> {
    labels: Vec<L>,
}

impl<L> Default for Bag<L> {
    fn default() -> Self {
        Bag { labels: Vec::new() }
    }
}

impl<L: RaptorLabel> Bag<L> {
    pub fn new() -> Self {
        Bag::default()
    }

    /// Inserts `label` unless it is dominated (or equalled) by a resident
    /// label; evicts residents the new label dominates. Returns whether the
    /// Pareto front changed.
    pub fn add(&mut self, label: L) -> bool {
        if !label.within_bounds() {
            return false;
        }
        // Checking domination of the newcomer first keeps re-offered equal
        // labels from reporting a front change.
        if self.labels.iter().any(|resident| resident.dominates(&label)) {
            return false;
        }
        self.labels.retain(|resident| !label.dominates(resident));
        self.labels.push(label);
        true
    }

    /// Merges `other` in, returning whether this bag's front changed.
    pub fn merge(&mut self, other: &Bag<L>) -> bool {
        let mut updated = false;
        for label in &other.labels {
            updated |= self.add(label.clone());
        }
        updated
    }

    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label minimizing total cost; equal costs prefer the earlier arrival.
    pub fn best_label(&self) -> Option<&L> {
        self.labels.iter().min_by(|a, b| {
            a.total_cost()
                .partial_cmp(&b.total_cost())
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.arrival_time().cmp(&b.arrival_time()))
        })
    }

    /// Labels reachable with an actual trip, as used by reconstruction.
    pub fn labels_with_trip(&self) -> impl Iterator<Item = &L> {
        self.labels.iter().filter(|l| l.trip().is_some())
    }
}

/// Maximal antichain of `labels` under componentwise dominance. With
/// `keep_equal`, labels equal on every criterion are all retained; otherwise
/// the first of an equal group survives.
pub(crate) fn pareto_set<L: RaptorLabel>(labels: &[L], keep_equal: bool) -> Vec<L> {
    let mut kept = Vec::new();
    'candidates: for (i, label) in labels.iter().enumerate() {
        for (j, other) in labels.iter().enumerate() {
            if i == j || !other.dominates(label) {
                continue;
            }
            let equal = label.dominates(other);
            if !equal || (!keep_equal && j < i) {
                continue 'candidates;
            }
        }
        kept.push(label.clone());
    }
    kept
}
