//! Partial-solution state.
//!
//! `SolutionState` is the running record of what has been placed so far
//! within one optimization attempt: slot occupancy, per-team usage,
//! simultaneous-match groups, double round-robin legs and per-pool venue
//! counters. Constraints and penalty calculators read it; only the
//! optimizer's inner loop writes it (through [`SolutionState::assign`]).
//!
//! Each attempt owns its own copy; the state is never shared between
//! concurrently running attempts.

use std::collections::{BTreeMap, HashMap};

use crate::models::{Match, Slot, TeamId};

/// Who plays in an already placed match (for simultaneity checks).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participants {
    /// Placed match id.
    pub match_id: String,
    /// Both team identities.
    pub teams: [TeamId; 2],
    /// Both institutions.
    pub institutions: [String; 2],
}

impl Participants {
    fn of(m: &Match) -> Self {
        Self {
            match_id: m.id.clone(),
            teams: [m.home.id.clone(), m.away.id.clone()],
            institutions: [m.home.institution.clone(), m.away.institution.clone()],
        }
    }
}

/// Occupancy and usage tables for one attempt.
#[derive(Debug, Clone, Default)]
pub struct SolutionState {
    /// Matches placed per slot.
    occupancy: HashMap<Slot, u32>,
    /// Team → week → times played.
    team_usage: HashMap<TeamId, BTreeMap<u32, Vec<String>>>,
    /// Week → time → participants of placed matches.
    simultaneous: HashMap<u32, HashMap<String, Vec<Participants>>>,
    /// (pool, home, away) → weeks the leg was placed in.
    legs: HashMap<(String, TeamId, TeamId), Vec<u32>>,
    /// Pool → venue → matches placed.
    pool_venue: HashMap<String, HashMap<String, u32>>,
    placed: usize,
}

impl SolutionState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a state pre-populated with already placed matches
    /// (locked, completed). Matches without a slot are ignored.
    pub fn seeded<'a>(matches: impl IntoIterator<Item = &'a Match>) -> Self {
        let mut state = Self::new();
        for m in matches {
            if let Some(slot) = &m.slot {
                state.assign(m, slot);
            }
        }
        state
    }

    /// Records `m` as placed in `slot`.
    pub fn assign(&mut self, m: &Match, slot: &Slot) {
        *self.occupancy.entry(slot.clone()).or_insert(0) += 1;

        for team in m.team_ids() {
            self.team_usage
                .entry(team.clone())
                .or_default()
                .entry(slot.week)
                .or_default()
                .push(slot.time.clone());
        }

        self.simultaneous
            .entry(slot.week)
            .or_default()
            .entry(slot.time.clone())
            .or_default()
            .push(Participants::of(m));

        self.legs
            .entry((m.pool.clone(), m.home.id.clone(), m.away.id.clone()))
            .or_default()
            .push(slot.week);

        *self
            .pool_venue
            .entry(m.pool.clone())
            .or_default()
            .entry(slot.venue.clone())
            .or_insert(0) += 1;

        self.placed += 1;
    }

    /// Matches currently placed in `slot`.
    pub fn occupancy(&self, slot: &Slot) -> u32 {
        self.occupancy.get(slot).copied().unwrap_or(0)
    }

    /// Whether `team` already plays at `week`/`time` (any venue).
    pub fn is_team_busy(&self, team: &TeamId, week: u32, time: &str) -> bool {
        self.team_usage
            .get(team)
            .and_then(|weeks| weeks.get(&week))
            .is_some_and(|times| times.iter().any(|t| t == time))
    }

    /// Matches `team` plays in `week`.
    pub fn team_week_count(&self, team: &TeamId, week: u32) -> u32 {
        self.team_usage
            .get(team)
            .and_then(|weeks| weeks.get(&week))
            .map_or(0, |times| times.len() as u32)
    }

    /// Weeks `team` already plays in, ascending.
    pub fn team_weeks(&self, team: &TeamId) -> impl Iterator<Item = u32> + '_ {
        self.team_usage
            .get(team)
            .into_iter()
            .flat_map(|weeks| weeks.keys().copied())
    }

    /// Participants of matches placed at `week`/`time` in any venue.
    pub fn simultaneous(&self, week: u32, time: &str) -> &[Participants] {
        self.simultaneous
            .get(&week)
            .and_then(|times| times.get(time))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Weeks of placed legs `home` vs `away` in `pool` (orientation matters).
    pub fn leg_weeks(&self, pool: &str, home: &TeamId, away: &TeamId) -> &[u32] {
        self.legs
            .get(&(pool.to_string(), home.clone(), away.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Matches of `pool` placed at `venue`.
    pub fn pool_venue_count(&self, pool: &str, venue: &str) -> u32 {
        self.pool_venue
            .get(pool)
            .and_then(|venues| venues.get(venue))
            .copied()
            .unwrap_or(0)
    }

    /// Total matches placed.
    pub fn placed_count(&self) -> usize {
        self.placed
    }
}
