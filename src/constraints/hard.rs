//! Hard constraints.
//!
//! A failing hard constraint makes an assignment illegal. All of them
//! report `penalty = 0`.

use std::collections::HashMap;
use std::sync::Arc;

use super::{Constraint, ConstraintOutcome};
use crate::models::{Match, PresenceObligation, Slot, Venue};
use crate::state::SolutionState;

/// Both teams can play that week and time, and neither excludes the venue.
#[derive(Debug, Clone, Copy)]
pub struct TeamAvailability;

impl Constraint for TeamAvailability {
    fn name(&self) -> &'static str {
        "team_availability"
    }

    fn evaluate(&self, m: &Match, slot: &Slot, _state: &SolutionState) -> ConstraintOutcome {
        ConstraintOutcome::check(
            m.teams()
                .iter()
                .all(|team| team.is_available(slot.week, &slot.time) && team.accepts_venue(&slot.venue)),
        )
    }

    fn is_hard(&self) -> bool {
        true
    }

    fn description(&self) -> &'static str {
        "Teams available and venue accepted"
    }
}

/// The venue exists, offers the time and is open that week.
#[derive(Debug, Clone)]
pub struct VenueAvailability {
    venues: Arc<HashMap<String, Venue>>,
}

impl VenueAvailability {
    /// Checks slots against the venue table.
    pub fn new(venues: Arc<HashMap<String, Venue>>) -> Self {
        Self { venues }
    }
}

impl Constraint for VenueAvailability {
    fn name(&self) -> &'static str {
        "venue_availability"
    }

    fn evaluate(&self, _m: &Match, slot: &Slot, _state: &SolutionState) -> ConstraintOutcome {
        let open = self.venues.get(&slot.venue).is_some_and(|venue| {
            venue.offers(&slot.time) && venue.effective_capacity(slot.week, &slot.time) > 0
        });
        ConstraintOutcome::check(open)
    }

    fn is_hard(&self) -> bool {
        true
    }

    fn description(&self) -> &'static str {
        "Venue open at that week and time"
    }
}

/// Matches already in the slot stay below the venue's effective capacity.
#[derive(Debug, Clone)]
pub struct VenueCapacity {
    venues: Arc<HashMap<String, Venue>>,
}

impl VenueCapacity {
    /// Checks occupancy against the venue table.
    pub fn new(venues: Arc<HashMap<String, Venue>>) -> Self {
        Self { venues }
    }
}

impl Constraint for VenueCapacity {
    fn name(&self) -> &'static str {
        "venue_capacity"
    }

    fn evaluate(&self, _m: &Match, slot: &Slot, state: &SolutionState) -> ConstraintOutcome {
        let capacity = self
            .venues
            .get(&slot.venue)
            .map_or(0, |venue| venue.effective_capacity(slot.week, &slot.time));
        ConstraintOutcome::check(state.occupancy(slot) < capacity)
    }

    fn is_hard(&self) -> bool {
        true
    }

    fn description(&self) -> &'static str {
        "Slot occupancy below venue capacity"
    }
}

/// Neither team already plays at the same week and time, in any venue.
#[derive(Debug, Clone, Copy)]
pub struct TeamDoubleBooking;

impl Constraint for TeamDoubleBooking {
    fn name(&self) -> &'static str {
        "team_double_booking"
    }

    fn evaluate(&self, m: &Match, slot: &Slot, state: &SolutionState) -> ConstraintOutcome {
        ConstraintOutcome::check(
            m.team_ids()
                .iter()
                .all(|team| !state.is_team_busy(team, slot.week, &slot.time)),
        )
    }

    fn is_hard(&self) -> bool {
        true
    }

    fn description(&self) -> &'static str {
        "No team plays twice at once"
    }
}

/// Neither team has reached its per-week match cap.
#[derive(Debug, Clone, Copy)]
pub struct WeeklyCap {
    max_per_week: u32,
}

impl WeeklyCap {
    /// Caps each team at `max_per_week` matches.
    pub fn new(max_per_week: u32) -> Self {
        Self { max_per_week }
    }
}

impl Constraint for WeeklyCap {
    fn name(&self) -> &'static str {
        "weekly_cap"
    }

    fn evaluate(&self, m: &Match, slot: &Slot, state: &SolutionState) -> ConstraintOutcome {
        ConstraintOutcome::check(
            m.team_ids()
                .iter()
                .all(|team| state.team_week_count(team, slot.week) < self.max_per_week),
        )
    }

    fn is_hard(&self) -> bool {
        true
    }

    fn description(&self) -> &'static str {
        "Per-team weekly match cap"
    }
}

/// Venues with a presence obligation only host matches involving the
/// obliged institution.
#[derive(Debug, Clone, Default)]
pub struct MandatoryPresence {
    obligations: Vec<PresenceObligation>,
}

impl MandatoryPresence {
    /// Enforces the given obligations.
    pub fn new(obligations: Vec<PresenceObligation>) -> Self {
        Self { obligations }
    }
}

impl Constraint for MandatoryPresence {
    fn name(&self) -> &'static str {
        "mandatory_presence"
    }

    fn evaluate(&self, m: &Match, slot: &Slot, _state: &SolutionState) -> ConstraintOutcome {
        let institutions = m.institutions();
        ConstraintOutcome::check(
            self.obligations
                .iter()
                .filter(|o| o.applies(&slot.venue, slot.week))
                .all(|o| institutions.contains(&o.institution.as_str())),
        )
    }

    fn is_hard(&self) -> bool {
        true
    }

    fn description(&self) -> &'static str {
        "Obliged institution present at its venue"
    }
}

/// Slot week is not earlier than the configured minimum.
#[derive(Debug, Clone, Copy)]
pub struct MinimumWeek {
    min_week: u32,
}

impl MinimumWeek {
    /// Rejects weeks before `min_week`.
    pub fn new(min_week: u32) -> Self {
        Self { min_week }
    }
}

impl Constraint for MinimumWeek {
    fn name(&self) -> &'static str {
        "minimum_week"
    }

    fn evaluate(&self, _m: &Match, slot: &Slot, _state: &SolutionState) -> ConstraintOutcome {
        ConstraintOutcome::check(slot.week >= self.min_week)
    }

    fn is_hard(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Team;

    fn team(name: &str, institution: &str) -> Arc<Team> {
        Arc::new(Team::new(name, "M").with_pool("P").with_institution(institution))
    }

    fn venues(list: Vec<Venue>) -> Arc<HashMap<String, Venue>> {
        Arc::new(list.into_iter().map(|v| (v.name.clone(), v)).collect())
    }

    #[test]
    fn test_team_availability() {
        let a = Arc::new(
            Team::new("A", "M")
                .with_unavailable_week(2)
                .with_unavailable_time(3, "18:00")
                .with_excluded_venue("Annex"),
        );
        let m = Match::new("m", a, team("B", "b"));
        let state = SolutionState::new();
        let c = TeamAvailability;
        assert!(c.evaluate(&m, &Slot::new(1, "18:00", "Gym"), &state).ok);
        assert!(!c.evaluate(&m, &Slot::new(2, "20:00", "Gym"), &state).ok);
        assert!(!c.evaluate(&m, &Slot::new(3, "18:00", "Gym"), &state).ok);
        assert!(c.evaluate(&m, &Slot::new(3, "20:00", "Gym"), &state).ok);
        assert!(!c.evaluate(&m, &Slot::new(1, "18:00", "Annex"), &state).ok);
    }

    #[test]
    fn test_venue_availability() {
        let table = venues(vec![
            Venue::new("Gym").with_time("18:00").with_unavailable_week(4),
            Venue::new("Hall").with_capacity_override(2, "19:00", 0),
        ]);
        let c = VenueAvailability::new(table);
        let m = Match::new("m", team("A", "a"), team("B", "b"));
        let state = SolutionState::new();
        assert!(c.evaluate(&m, &Slot::new(1, "18:00", "Gym"), &state).ok);
        assert!(!c.evaluate(&m, &Slot::new(1, "20:00", "Gym"), &state).ok);
        assert!(!c.evaluate(&m, &Slot::new(4, "18:00", "Gym"), &state).ok);
        assert!(!c.evaluate(&m, &Slot::new(2, "19:00", "Hall"), &state).ok);
        assert!(c.evaluate(&m, &Slot::new(2, "20:00", "Hall"), &state).ok);
        assert!(!c.evaluate(&m, &Slot::new(1, "18:00", "Nowhere"), &state).ok);
    }

    #[test]
    fn test_venue_capacity() {
        let c = VenueCapacity::new(venues(vec![Venue::new("Gym").with_capacity(2)]));
        let slot = Slot::new(1, "18:00", "Gym");
        let mut state = SolutionState::new();
        let m = Match::new("m", team("A", "a"), team("B", "b"));
        assert!(c.evaluate(&m, &slot, &state).ok);
        state.assign(&Match::new("x", team("C", "c"), team("D", "d")), &slot);
        assert!(c.evaluate(&m, &slot, &state).ok);
        state.assign(&Match::new("y", team("E", "e"), team("F", "f")), &slot);
        assert!(!c.evaluate(&m, &slot, &state).ok);
    }

    #[test]
    fn test_double_booking_and_weekly_cap() {
        let a = team("A", "a");
        let mut state = SolutionState::new();
        state.assign(&Match::new("x", Arc::clone(&a), team("C", "c")), &Slot::new(1, "18:00", "Gym"));
        let m = Match::new("m", a, team("B", "b"));

        let busy = TeamDoubleBooking;
        assert!(!busy.evaluate(&m, &Slot::new(1, "18:00", "Annex"), &state).ok);
        assert!(busy.evaluate(&m, &Slot::new(1, "20:00", "Annex"), &state).ok);

        assert!(!WeeklyCap::new(1).evaluate(&m, &Slot::new(1, "20:00", "Gym"), &state).ok);
        assert!(WeeklyCap::new(2).evaluate(&m, &Slot::new(1, "20:00", "Gym"), &state).ok);
        assert!(WeeklyCap::new(1).evaluate(&m, &Slot::new(2, "20:00", "Gym"), &state).ok);
    }

    #[test]
    fn test_mandatory_presence() {
        let c = MandatoryPresence::new(vec![PresenceObligation::new("Gym", "Host").with_week(1)]);
        let state = SolutionState::new();
        let guests = Match::new("m", team("A", "a"), team("B", "b"));
        let hosted = Match::new("h", team("H", "Host"), team("B", "b"));

        assert!(!c.evaluate(&guests, &Slot::new(1, "18:00", "Gym"), &state).ok);
        assert!(c.evaluate(&hosted, &Slot::new(1, "18:00", "Gym"), &state).ok);
        assert!(c.evaluate(&guests, &Slot::new(2, "18:00", "Gym"), &state).ok);
        assert!(c.evaluate(&guests, &Slot::new(1, "18:00", "Annex"), &state).ok);
    }

    #[test]
    fn test_minimum_week() {
        let c = MinimumWeek::new(3);
        let m = Match::new("m", team("A", "a"), team("B", "b"));
        let state = SolutionState::new();
        assert!(!c.evaluate(&m, &Slot::new(2, "18:00", "Gym"), &state).ok);
        assert!(c.evaluate(&m, &Slot::new(3, "18:00", "Gym"), &state).ok);
    }
}
