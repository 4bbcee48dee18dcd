//! Soft constraints.
//!
//! Thin adapters from the [`crate::penalty`] calculators to the
//! [`Constraint`] trait. Weights are applied by the validator.

use super::{Constraint, ConstraintOutcome};
use crate::config::{OrderingConfig, OrderingMode, OverlapConfig, RoundTripConfig, TimePreferenceConfig};
use crate::models::{Match, Slot};
use crate::penalty;
use crate::state::SolutionState;

/// Distance from the teams' preferred start time.
#[derive(Debug, Clone)]
pub struct TimePreference {
    config: TimePreferenceConfig,
}

impl TimePreference {
    /// Uses the given multipliers, divisor and tolerance.
    pub fn new(config: TimePreferenceConfig) -> Self {
        Self { config }
    }
}

impl Constraint for TimePreference {
    fn name(&self) -> &'static str {
        "time_preference"
    }

    fn evaluate(&self, m: &Match, slot: &Slot, _state: &SolutionState) -> ConstraintOutcome {
        ConstraintOutcome::cost(penalty::time_preference(m, slot, &self.config))
    }

    fn is_hard(&self) -> bool {
        false
    }

    fn description(&self) -> &'static str {
        "Preferred start time"
    }
}

/// Weeks of rest since each team's nearest placed match.
#[derive(Debug, Clone)]
pub struct RestSpacing {
    table: Vec<f64>,
}

impl RestSpacing {
    /// `table[rest]` is charged per team.
    pub fn new(table: Vec<f64>) -> Self {
        Self { table }
    }
}

impl Constraint for RestSpacing {
    fn name(&self) -> &'static str {
        "rest_spacing"
    }

    fn evaluate(&self, m: &Match, slot: &Slot, state: &SolutionState) -> ConstraintOutcome {
        ConstraintOutcome::cost(penalty::rest_spacing(m, slot, state, &self.table))
    }

    fn is_hard(&self) -> bool {
        false
    }
}

/// Rank of the venue in the teams' preference lists.
#[derive(Debug, Clone)]
pub struct VenuePreference {
    bonuses: Vec<f64>,
}

impl VenuePreference {
    /// Bonuses by preference rank.
    pub fn new(bonuses: Vec<f64>) -> Self {
        Self { bonuses }
    }
}

impl Constraint for VenuePreference {
    fn name(&self) -> &'static str {
        "venue_preference"
    }

    fn evaluate(&self, m: &Match, slot: &Slot, _state: &SolutionState) -> ConstraintOutcome {
        ConstraintOutcome::cost(penalty::venue_preference(m, slot, &self.bonuses))
    }

    fn is_hard(&self) -> bool {
        false
    }

    fn description(&self) -> &'static str {
        "Preferred venue"
    }
}

/// Late weeks cost more, pulling the calendar forward.
#[derive(Debug, Clone)]
pub struct Compaction {
    table: Vec<f64>,
}

impl Compaction {
    /// Penalty by week, index 0 = week 1.
    pub fn new(table: Vec<f64>) -> Self {
        Self { table }
    }
}

impl Constraint for Compaction {
    fn name(&self) -> &'static str {
        "compaction"
    }

    fn evaluate(&self, _m: &Match, slot: &Slot, _state: &SolutionState) -> ConstraintOutcome {
        ConstraintOutcome::cost(penalty::compaction(slot, &self.table))
    }

    fn is_hard(&self) -> bool {
        false
    }
}

/// Simultaneous matches of the same institution or non-simultaneity group.
#[derive(Debug, Clone)]
pub struct EntityOverlap {
    config: OverlapConfig,
}

impl EntityOverlap {
    /// Uses the given penalty and groups.
    pub fn new(config: OverlapConfig) -> Self {
        Self { config }
    }
}

impl Constraint for EntityOverlap {
    fn name(&self) -> &'static str {
        "entity_overlap"
    }

    fn evaluate(&self, m: &Match, slot: &Slot, state: &SolutionState) -> ConstraintOutcome {
        ConstraintOutcome::cost(penalty::entity_overlap(m, slot, state, &self.config))
    }

    fn is_hard(&self) -> bool {
        false
    }

    fn description(&self) -> &'static str {
        "Related entities play at the same time"
    }
}

/// Both legs of a double round-robin pairing too close together.
#[derive(Debug, Clone)]
pub struct RoundTripSpacing {
    config: RoundTripConfig,
}

impl RoundTripSpacing {
    /// Uses the given pools and penalties.
    pub fn new(config: RoundTripConfig) -> Self {
        Self { config }
    }
}

impl Constraint for RoundTripSpacing {
    fn name(&self) -> &'static str {
        "round_trip_spacing"
    }

    fn evaluate(&self, m: &Match, slot: &Slot, state: &SolutionState) -> ConstraintOutcome {
        ConstraintOutcome::cost(penalty::round_trip(m, slot, state, &self.config))
    }

    fn is_hard(&self) -> bool {
        false
    }
}

/// Pairings bound to be played before or after a given week.
///
/// Hard or soft depending on [`OrderingMode`]: in hard mode any week
/// outside the bound is illegal, in soft mode each such week costs
/// `penalty_per_week`.
#[derive(Debug, Clone)]
pub struct TemporalOrdering {
    config: OrderingConfig,
}

impl TemporalOrdering {
    /// Hard or soft per `config.mode`.
    pub fn new(config: OrderingConfig) -> Self {
        Self { config }
    }
}

impl Constraint for TemporalOrdering {
    fn name(&self) -> &'static str {
        "temporal_ordering"
    }

    fn evaluate(&self, m: &Match, slot: &Slot, _state: &SolutionState) -> ConstraintOutcome {
        match self.config.mode {
            OrderingMode::Hard => ConstraintOutcome::check(
                penalty::ordering_excess(m, slot.week, &self.config.constraints) == 0,
            ),
            OrderingMode::Soft => ConstraintOutcome::cost(penalty::ordering(
                m,
                slot,
                &self.config.constraints,
                self.config.penalty_per_week,
            )),
        }
    }

    fn is_hard(&self) -> bool {
        self.config.mode == OrderingMode::Hard
    }

    fn description(&self) -> &'static str {
        "Pairing played before or after a given week"
    }
}
