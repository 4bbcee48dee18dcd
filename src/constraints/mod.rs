//! Constraint engine.
//!
//! A [`Constraint`] judges one candidate assignment (match, slot, partial
//! state) and returns a [`ConstraintOutcome`]. The [`Validator`] composes
//! an ordered list of constraints with weights:
//!
//! - any failing **hard** constraint makes the assignment illegal
//!   (`(false, +∞)`), short-circuiting the rest;
//! - otherwise the weighted penalties of all constraints are summed.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use u_league::constraints::{hard, Validator};
//! use u_league::models::{Match, Slot, Team};
//! use u_league::state::SolutionState;
//!
//! let validator = Validator::new()
//!     .with_constraint(hard::TeamDoubleBooking)
//!     .with_constraint(hard::MinimumWeek::new(2));
//!
//! let m = Match::new("m1", Arc::new(Team::new("A", "M")), Arc::new(Team::new("B", "M")));
//! let state = SolutionState::new();
//! assert!(!validator.validate(&m, &Slot::new(1, "18:00", "Gym"), &state).0);
//! assert!(validator.validate(&m, &Slot::new(2, "18:00", "Gym"), &state).0);
//! ```

pub mod hard;
pub mod soft;

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::config::SchedulerConfig;
use crate::models::{Match, PresenceObligation, Slot, Venue};
use crate::state::SolutionState;

/// Result of evaluating one constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstraintOutcome {
    /// Whether the constraint is satisfied.
    pub ok: bool,
    /// Non-negative cost (soft constraints), or a signed bonus for
    /// preference-style constraints.
    pub penalty: f64,
}

impl ConstraintOutcome {
    /// Satisfied, no cost.
    pub fn pass() -> Self {
        Self { ok: true, penalty: 0.0 }
    }

    /// Violated.
    pub fn fail() -> Self {
        Self { ok: false, penalty: 0.0 }
    }

    /// Hard check: passes iff `ok`.
    pub fn check(ok: bool) -> Self {
        Self { ok, penalty: 0.0 }
    }

    /// Soft cost: satisfied iff the cost is not positive.
    pub fn cost(penalty: f64) -> Self {
        Self {
            ok: penalty <= 0.0,
            penalty,
        }
    }
}

/// A scheduling rule evaluated against a candidate assignment.
pub trait Constraint: Send + Sync + Debug {
    /// Stable name used in reports.
    fn name(&self) -> &'static str;

    /// Evaluates placing `m` in `slot` given what is already placed.
    fn evaluate(&self, m: &Match, slot: &Slot, state: &SolutionState) -> ConstraintOutcome;

    /// Whether a violation makes the assignment illegal.
    fn is_hard(&self) -> bool;

    /// Default weight applied by the validator.
    fn weight(&self) -> f64 {
        1.0
    }

    /// Human-readable description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

#[derive(Debug, Clone)]
struct WeightedConstraint {
    constraint: Arc<dyn Constraint>,
    weight: f64,
}

/// Ordered, weighted collection of constraints.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    constraints: Vec<WeightedConstraint>,
}

impl Validator {
    /// Creates an empty validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a constraint with its own default weight.
    pub fn with_constraint<C: Constraint + 'static>(mut self, constraint: C) -> Self {
        let weight = constraint.weight();
        self.constraints.push(WeightedConstraint {
            constraint: Arc::new(constraint),
            weight,
        });
        self
    }

    /// Adds a constraint with an explicit weight.
    pub fn with_weighted_constraint<C: Constraint + 'static>(mut self, constraint: C, weight: f64) -> Self {
        self.constraints.push(WeightedConstraint {
            constraint: Arc::new(constraint),
            weight,
        });
        self
    }

    /// Appends every constraint of `other`, keeping its weights.
    pub fn extend(mut self, other: Validator) -> Self {
        self.constraints.extend(other.constraints);
        self
    }

    /// Builds the full rule set used by the optimizers and the auditor.
    ///
    /// Hard: team availability, venue availability, venue capacity,
    /// double booking, weekly cap, mandatory presence, minimum week, and
    /// temporal ordering when configured as hard. Soft: time preference,
    /// rest spacing, venue preference, compaction, entity overlap,
    /// double round-trip spacing, and temporal ordering when soft.
    pub fn standard(config: &SchedulerConfig, venues: &[Venue], obligations: &[PresenceObligation]) -> Self {
        let table: Arc<HashMap<String, Venue>> = Arc::new(
            venues
                .iter()
                .map(|v| (v.name.clone(), v.clone()))
                .collect(),
        );
        let w = &config.weights;

        Self::new()
            .with_constraint(hard::MinimumWeek::new(config.min_week))
            .with_constraint(hard::VenueAvailability::new(Arc::clone(&table)))
            .with_constraint(hard::TeamAvailability)
            .with_constraint(hard::TeamDoubleBooking)
            .with_constraint(hard::WeeklyCap::new(config.max_matches_per_week))
            .with_constraint(hard::VenueCapacity::new(table))
            .with_constraint(hard::MandatoryPresence::new(obligations.to_vec()))
            .with_weighted_constraint(soft::TemporalOrdering::new(config.ordering.clone()), w.ordering)
            .with_weighted_constraint(soft::TimePreference::new(config.time_preference.clone()), w.time_preference)
            .with_weighted_constraint(soft::RestSpacing::new(config.rest_penalties.clone()), w.rest)
            .with_weighted_constraint(soft::VenuePreference::new(config.venue_rank_bonuses.clone()), w.venue_preference)
            .with_weighted_constraint(soft::Compaction::new(config.compaction_penalties.clone()), w.compaction)
            .with_weighted_constraint(soft::EntityOverlap::new(config.overlap.clone()), w.overlap)
            .with_weighted_constraint(soft::RoundTripSpacing::new(config.round_trip.clone()), w.round_trip)
    }

    /// Judges an assignment: `(legal, weighted penalty)`.
    ///
    /// A failing hard constraint returns `(false, f64::INFINITY)` at once.
    pub fn validate(&self, m: &Match, slot: &Slot, state: &SolutionState) -> (bool, f64) {
        let mut total = 0.0;
        for wc in &self.constraints {
            let outcome = wc.constraint.evaluate(m, slot, state);
            if wc.constraint.is_hard() && !outcome.ok {
                return (false, f64::INFINITY);
            }
            total += wc.weight * outcome.penalty;
        }
        (true, total)
    }

    /// Names of every failing constraint, hard or soft, without short-circuit.
    pub fn violations(&self, m: &Match, slot: &Slot, state: &SolutionState) -> Vec<&'static str> {
        self.constraints
            .iter()
            .filter(|wc| !wc.constraint.evaluate(m, slot, state).ok)
            .map(|wc| wc.constraint.name())
            .collect()
    }

    /// Names of failing hard constraints only.
    pub fn hard_violations(&self, m: &Match, slot: &Slot, state: &SolutionState) -> Vec<&'static str> {
        self.constraints
            .iter()
            .filter(|wc| wc.constraint.is_hard())
            .filter(|wc| !wc.constraint.evaluate(m, slot, state).ok)
            .map(|wc| wc.constraint.name())
            .collect()
    }

    /// Weighted penalty per soft constraint, for reporting.
    pub fn soft_breakdown(&self, m: &Match, slot: &Slot, state: &SolutionState) -> Vec<(&'static str, f64)> {
        self.constraints
            .iter()
            .filter(|wc| !wc.constraint.is_hard())
            .map(|wc| (wc.constraint.name(), wc.weight * wc.constraint.evaluate(m, slot, state).penalty))
            .collect()
    }

    /// Constraint names in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.constraints.iter().map(|wc| wc.constraint.name()).collect()
    }

    /// Number of constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the validator has no constraints.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}
