//! Soft-constraint penalty calculators.
//!
//! Pure functions over a match, a candidate slot and (where needed) the
//! partial-solution state. They are combined additively into the
//! objective by the soft constraints in [`crate::constraints`] and
//! recomputed by the [`crate::audit`] module for reporting.
//!
//! # Convention
//! Positive = cost, negative = bonus. The objective is minimized.

mod time_preference;

pub use time_preference::{
    classify as classify_time, multiplier as time_multiplier, time_preference, TimeFit,
};

use std::collections::BTreeSet;

use crate::config::{OrderingConstraint, OverlapConfig, RoundTripConfig, SchedulerConfig};
use crate::models::{Match, Slot};
use crate::state::{Participants, SolutionState};

/// Rest-spacing cost.
///
/// For each team, the week of its nearest already placed match gives
/// `rest = |Δweek| − 1` (clamped at 0). `table[rest]` is charged; rest
/// beyond the table is free.
pub fn rest_spacing(m: &Match, slot: &Slot, state: &SolutionState, table: &[f64]) -> f64 {
    m.team_ids()
        .iter()
        .filter_map(|team| state.team_weeks(team).map(|w| w.abs_diff(slot.week)).min())
        .map(|gap| {
            let rest = gap.saturating_sub(1) as usize;
            table.get(rest).copied().unwrap_or(0.0)
        })
        .sum()
}

/// Venue-preference cost.
///
/// Starts from `2 × max(bonuses)` and subtracts, for each team ranking the
/// venue, the bonus at that rank. An unranked venue costs the base; a
/// venue both teams rank first costs `2 × (max − bonus[0])`.
pub fn venue_preference(m: &Match, slot: &Slot, bonuses: &[f64]) -> f64 {
    let best = bonuses.iter().copied().fold(0.0_f64, f64::max);
    let base = 2.0 * best;
    let earned: f64 = m
        .teams()
        .iter()
        .filter_map(|team| team.venue_rank(&slot.venue))
        .map(|rank| bonuses.get(rank).copied().unwrap_or(0.0))
        .sum();
    base - earned
}

/// Temporal compaction cost: `table[week − 1]`, reusing the last entry
/// past the end of the table.
pub fn compaction(slot: &Slot, table: &[f64]) -> f64 {
    match table.last() {
        None => 0.0,
        Some(&last) => {
            let idx = slot.week.saturating_sub(1) as usize;
            table.get(idx).copied().unwrap_or(last)
        }
    }
}

/// Names (teams and institutions) a match contributes to non-simultaneity checks.
fn members(m: &Match) -> BTreeSet<&str> {
    let mut names = BTreeSet::new();
    for team in m.teams() {
        names.insert(team.id.name.as_str());
        names.insert(team.institution.as_str());
    }
    names.remove("");
    names
}

/// Whether a placed match conflicts with `m` under the overlap rules.
pub fn conflicts(m: &Match, other: &Participants, groups: &[BTreeSet<String>]) -> bool {
    if other.match_id == m.id {
        return false;
    }
    if groups.is_empty() {
        return m
            .institutions()
            .iter()
            .filter(|inst| !inst.is_empty())
            .any(|inst| other.institutions.iter().any(|o| o.as_str() == *inst));
    }
    let mine = members(m);
    let theirs: BTreeSet<&str> = other
        .teams
        .iter()
        .map(|t| t.name.as_str())
        .chain(other.institutions.iter().map(String::as_str))
        .filter(|s| !s.is_empty())
        .collect();
    groups.iter().any(|group| {
        mine.iter().any(|n| group.contains(*n)) && theirs.iter().any(|n| group.contains(*n))
    })
}

/// Entity-overlap cost: `penalty` per placed match at the same week and
/// time (any venue) that shares an institution or non-simultaneity group.
pub fn entity_overlap(m: &Match, slot: &Slot, state: &SolutionState, config: &OverlapConfig) -> f64 {
    let clashes = state
        .simultaneous(slot.week, &slot.time)
        .iter()
        .filter(|other| conflicts(m, other, &config.groups))
        .count();
    clashes as f64 * config.penalty
}

/// Double round-robin spacing cost.
///
/// In a double round-robin pool, the return leg (same teams, reversed
/// order) placed in the same week costs `same_week_penalty`; in an
/// adjacent week `adjacent_week_penalty`.
pub fn round_trip(m: &Match, slot: &Slot, state: &SolutionState, config: &RoundTripConfig) -> f64 {
    if !config.double_round_robin_pools.contains(&m.pool) {
        return 0.0;
    }
    let nearest = state
        .leg_weeks(&m.pool, &m.away.id, &m.home.id)
        .iter()
        .map(|w| w.abs_diff(slot.week))
        .min();
    match nearest {
        Some(0) => config.same_week_penalty,
        Some(1) => config.adjacent_week_penalty,
        _ => 0.0,
    }
}

/// Whether both institutions of `m` form an entente.
pub fn is_entente(m: &Match, config: &SchedulerConfig) -> bool {
    let [a, b] = m.institutions();
    config.is_entente(a, b)
}

/// Cost of leaving `m` unplaced (reduced for ententes).
pub fn unscheduled(m: &Match, config: &SchedulerConfig) -> f64 {
    if is_entente(m, config) {
        config.entente_unscheduled_penalty
    } else {
        config.unscheduled_penalty
    }
}

/// Total weeks by which placing `m` in `week` misses its ordering bounds.
pub fn ordering_excess(m: &Match, week: u32, constraints: &[OrderingConstraint]) -> u32 {
    constraints
        .iter()
        .filter(|c| m.is_pair(&c.team_a, &c.team_b))
        .map(|c| c.weeks_outside(week))
        .sum()
}

/// Soft-mode temporal ordering cost.
pub fn ordering(m: &Match, slot: &Slot, constraints: &[OrderingConstraint], per_week: f64) -> f64 {
    f64::from(ordering_excess(m, slot.week, constraints)) * per_week
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Team, TeamId};
    use std::sync::Arc;

    fn team(name: &str, institution: &str) -> Arc<Team> {
        Arc::new(Team::new(name, "M").with_pool("P").with_institution(institution))
    }

    fn pair(id: &str, a: &Arc<Team>, b: &Arc<Team>) -> Match {
        Match::new(id, Arc::clone(a), Arc::clone(b))
    }

    #[test]
    fn test_rest_spacing() {
        let a = team("A", "a");
        let b = team("B", "b");
        let c = team("C", "c");
        let mut state = SolutionState::new();
        state.assign(&pair("m0", &a, &c), &Slot::new(3, "18:00", "Gym"));

        let table = [100.0, 30.0, 10.0];
        let m = pair("m1", &a, &b);
        // Week 4: back-to-back for A, B has no history.
        assert!((rest_spacing(&m, &Slot::new(4, "18:00", "Gym"), &state, &table) - 100.0).abs() < 1e-10);
        // Week 5: one week of rest.
        assert!((rest_spacing(&m, &Slot::new(5, "18:00", "Gym"), &state, &table) - 30.0).abs() < 1e-10);
        // Week 1: one week of rest (before).
        assert!((rest_spacing(&m, &Slot::new(1, "18:00", "Gym"), &state, &table) - 30.0).abs() < 1e-10);
        // Week 9: beyond the table.
        assert!((rest_spacing(&m, &Slot::new(9, "18:00", "Gym"), &state, &table) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_rest_spacing_sums_both_teams() {
        let a = team("A", "a");
        let b = team("B", "b");
        let c = team("C", "c");
        let d = team("D", "d");
        let mut state = SolutionState::new();
        state.assign(&pair("m0", &a, &c), &Slot::new(3, "18:00", "Gym"));
        state.assign(&pair("m1", &b, &d), &Slot::new(2, "18:00", "Gym"));
        let m = pair("m2", &a, &b);
        let cost = rest_spacing(&m, &Slot::new(4, "18:00", "Gym"), &state, &[100.0, 30.0]);
        assert!((cost - 130.0).abs() < 1e-10);
    }

    #[test]
    fn test_venue_preference() {
        let bonuses = [30.0, 20.0, 10.0];
        let a = Arc::new(Team::new("A", "M").with_venue_preference(0, "Main").with_venue_preference(2, "Annex"));
        let b = Arc::new(Team::new("B", "M").with_venue_preference(1, "Main"));
        let m = Match::new("m", a, b);

        // base 60; A ranks Main 0 (−30), B ranks Main 1 (−20)
        assert!((venue_preference(&m, &Slot::new(1, "18:00", "Main"), &bonuses) - 10.0).abs() < 1e-10);
        // A ranks Annex 2 (−10)
        assert!((venue_preference(&m, &Slot::new(1, "18:00", "Annex"), &bonuses) - 50.0).abs() < 1e-10);
        // unranked
        assert!((venue_preference(&m, &Slot::new(1, "18:00", "Other"), &bonuses) - 60.0).abs() < 1e-10);
        // no bonus table → free
        assert!((venue_preference(&m, &Slot::new(1, "18:00", "Other"), &[]) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_venue_rank_past_bonus_table() {
        let a = Arc::new(Team::new("A", "M").with_venue_preference(5, "Main"));
        let m = Match::new("m", a, Arc::new(Team::new("B", "M")));
        assert!((venue_preference(&m, &Slot::new(1, "18:00", "Main"), &[10.0]) - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_compaction() {
        let table = [0.0, 5.0, 10.0];
        assert!((compaction(&Slot::new(1, "18:00", "G"), &table) - 0.0).abs() < 1e-10);
        assert!((compaction(&Slot::new(3, "18:00", "G"), &table) - 10.0).abs() < 1e-10);
        assert!((compaction(&Slot::new(12, "18:00", "G"), &table) - 10.0).abs() < 1e-10);
        assert!((compaction(&Slot::new(12, "18:00", "G"), &[]) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_overlap_same_institution_other_venue() {
        let men = Arc::new(Team::new("North", "M").with_institution("North Club"));
        let women = Arc::new(Team::new("North", "F").with_institution("North Club"));
        let x = team("X", "x");
        let y = team("Y", "y");

        let mut state = SolutionState::new();
        state.assign(&pair("m0", &men, &x), &Slot::new(1, "18:00", "Gym"));

        let config = OverlapConfig { penalty: 50.0, groups: Vec::new() };
        let m = pair("m1", &women, &y);
        assert!((entity_overlap(&m, &Slot::new(1, "18:00", "Annex"), &state, &config) - 50.0).abs() < 1e-10);
        assert!((entity_overlap(&m, &Slot::new(1, "20:00", "Annex"), &state, &config) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_overlap_groups() {
        let a = team("A", "North");
        let b = team("B", "South");
        let x = team("X", "x");
        let y = team("Y", "y");
        let mut state = SolutionState::new();
        state.assign(&pair("m0", &a, &x), &Slot::new(1, "18:00", "Gym"));

        let group: BTreeSet<String> = ["North".to_string(), "South".to_string()].into();
        let config = OverlapConfig { penalty: 20.0, groups: vec![group] };
        let m = pair("m1", &b, &y);
        assert!((entity_overlap(&m, &Slot::new(1, "18:00", "Annex"), &state, &config) - 20.0).abs() < 1e-10);

        let unrelated = pair("m2", &y, &team("Z", "z"));
        assert!((entity_overlap(&unrelated, &Slot::new(1, "18:00", "Annex"), &state, &config) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_round_trip() {
        let a = team("A", "a");
        let b = team("B", "b");
        let mut state = SolutionState::new();
        state.assign(&pair("first", &a, &b), &Slot::new(4, "18:00", "Gym"));

        let mut config = RoundTripConfig::default();
        let ret = pair("return", &b, &a);
        // pool not double round-robin
        assert!((round_trip(&ret, &Slot::new(4, "20:00", "Gym"), &state, &config) - 0.0).abs() < 1e-10);

        config.double_round_robin_pools.insert("P".into());
        assert!((round_trip(&ret, &Slot::new(4, "20:00", "Gym"), &state, &config) - 1000.0).abs() < 1e-10);
        assert!((round_trip(&ret, &Slot::new(5, "20:00", "Gym"), &state, &config) - 200.0).abs() < 1e-10);
        assert!((round_trip(&ret, &Slot::new(8, "20:00", "Gym"), &state, &config) - 0.0).abs() < 1e-10);

        // same orientation is not a return leg
        let again = pair("again", &a, &b);
        assert!((round_trip(&again, &Slot::new(4, "20:00", "Gym"), &state, &config) - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_unscheduled_entente() {
        let config = SchedulerConfig::default().with_entente("North", "South");
        let normal = pair("m0", &team("A", "North"), &team("B", "East"));
        let entente = pair("m1", &team("A", "North"), &team("C", "South"));
        assert!((unscheduled(&normal, &config) - 10_000.0).abs() < 1e-10);
        assert!((unscheduled(&entente, &config) - 100.0).abs() < 1e-10);
        assert!(is_entente(&entente, &config));
    }

    #[test]
    fn test_ordering() {
        let a = team("A", "a");
        let b = team("B", "b");
        let m = pair("m", &a, &b);
        let constraints = vec![OrderingConstraint::before(TeamId::new("B", "M"), TeamId::new("A", "M"), 3)];
        assert_eq!(ordering_excess(&m, 3, &constraints), 0);
        assert_eq!(ordering_excess(&m, 6, &constraints), 3);
        assert!((ordering(&m, &Slot::new(6, "18:00", "G"), &constraints, 10.0) - 30.0).abs() < 1e-10);
    }
}
