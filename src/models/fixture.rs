//! Match model and fixture generation.
//!
//! A match pairs two teams of a pool. The optimizer only ever writes the
//! `slot` field (and the status that goes with it); everything else is
//! fixed when the match is built from loaded input.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{Slot, Team, TeamId};

/// Lifecycle status of a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchStatus {
    /// Not yet placed.
    #[default]
    Unscheduled,
    /// Placed by an optimizer.
    Scheduled,
    /// Fixed by the user; never reassigned.
    Locked,
    /// Already played.
    Completed,
    /// Will not be played.
    Cancelled,
}

/// A pairing of two teams, optionally assigned to a slot.
///
/// Teams are shared (`Arc`) because the team table is read-only during
/// optimization and is referenced by every attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    /// Stable match identifier.
    pub id: String,
    /// First (home) team.
    pub home: Arc<Team>,
    /// Second (away) team.
    pub away: Arc<Team>,
    /// Pool the match belongs to.
    pub pool: String,
    /// Assigned slot, if any.
    pub slot: Option<Slot>,
    /// Placement priority (higher = placed earlier).
    pub priority: i32,
    /// Locked matches keep their slot.
    pub locked: bool,
    /// Lifecycle status.
    pub status: MatchStatus,
    /// Recorded result (home, away).
    pub scores: Option<(u32, u32)>,
    /// Free-text notes.
    pub notes: String,
}

impl Match {
    /// Creates an unscheduled match in the home team's pool.
    pub fn new(id: impl Into<String>, home: Arc<Team>, away: Arc<Team>) -> Self {
        let pool = home.pool.clone();
        Self {
            id: id.into(),
            home,
            away,
            pool,
            slot: None,
            priority: 0,
            locked: false,
            status: MatchStatus::Unscheduled,
            scores: None,
            notes: String::new(),
        }
    }

    /// Sets the pool.
    pub fn with_pool(mut self, pool: impl Into<String>) -> Self {
        self.pool = pool.into();
        self
    }

    /// Sets the placement priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Locks the match into `slot`.
    pub fn locked_at(mut self, slot: Slot) -> Self {
        self.slot = Some(slot);
        self.locked = true;
        self.status = MatchStatus::Locked;
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the slot without locking.
    pub fn with_slot(mut self, slot: Slot) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Records a result.
    pub fn with_scores(mut self, home: u32, away: u32) -> Self {
        self.scores = Some((home, away));
        self
    }

    /// Sets free-text notes.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Whether an optimizer may (re)assign this match.
    pub fn is_modifiable(&self) -> bool {
        !self.locked
            && !matches!(
                self.status,
                MatchStatus::Locked | MatchStatus::Completed | MatchStatus::Cancelled
            )
    }

    /// Both teams.
    pub fn teams(&self) -> [&Team; 2] {
        [&self.home, &self.away]
    }

    /// Both team identities.
    pub fn team_ids(&self) -> [&TeamId; 2] {
        [&self.home.id, &self.away.id]
    }

    /// Both institutions.
    pub fn institutions(&self) -> [&str; 2] {
        [&self.home.institution, &self.away.institution]
    }

    /// Whether `team` plays in this match.
    pub fn involves(&self, team: &TeamId) -> bool {
        self.home.id == *team || self.away.id == *team
    }

    /// Whether the match is the same pairing as `a` vs `b` in either order.
    pub fn is_pair(&self, a: &TeamId, b: &TeamId) -> bool {
        (self.home.id == *a && self.away.id == *b) || (self.home.id == *b && self.away.id == *a)
    }

    /// Human-readable label.
    pub fn label(&self) -> String {
        format!("{} vs {}", self.home.id, self.away.id)
    }
}

/// Generates every pairing of `teams` for one pool.
///
/// With `double`, each pairing is played twice with home and away swapped
/// on the return leg. Ids are `"{pool}-{n}"` in generation order.
pub fn round_robin(pool: &str, teams: &[Arc<Team>], double: bool) -> Vec<Match> {
    let mut matches = Vec::new();
    let mut n = 0usize;
    let mut push = |home: &Arc<Team>, away: &Arc<Team>, matches: &mut Vec<Match>| {
        n += 1;
        matches.push(
            Match::new(format!("{pool}-{n}"), Arc::clone(home), Arc::clone(away)).with_pool(pool),
        );
    };

    for (i, home) in teams.iter().enumerate() {
        for away in &teams[i + 1..] {
            push(home, away, &mut matches);
        }
    }
    if double {
        for (i, home) in teams.iter().enumerate() {
            for away in &teams[i + 1..] {
                push(away, home, &mut matches);
            }
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(name: &str) -> Arc<Team> {
        Arc::new(Team::new(name, "M").with_pool("P").with_institution(name))
    }

    #[test]
    fn test_match_builder() {
        let m = Match::new("m1", team("A"), team("B"))
            .with_priority(5)
            .with_notes("derby")
            .with_scores(2, 1);

        assert_eq!(m.pool, "P");
        assert_eq!(m.priority, 5);
        assert_eq!(m.notes, "derby");
        assert_eq!(m.scores, Some((2, 1)));
        assert!(m.is_modifiable());
        assert_eq!(m.label(), "A (M) vs B (M)");
    }

    #[test]
    fn test_modifiable_rules() {
        let base = Match::new("m1", team("A"), team("B"));
        assert!(base.clone().with_status(MatchStatus::Scheduled).is_modifiable());
        assert!(!base.clone().with_status(MatchStatus::Completed).is_modifiable());
        assert!(!base.clone().with_status(MatchStatus::Cancelled).is_modifiable());
        assert!(!base.clone().locked_at(Slot::new(1, "18:00", "Gym")).is_modifiable());

        let mut flag_only = base;
        flag_only.locked = true;
        assert!(!flag_only.is_modifiable());
    }

    #[test]
    fn test_pair_matching() {
        let m = Match::new("m1", team("A"), team("B"));
        let a = TeamId::new("A", "M");
        let b = TeamId::new("B", "M");
        let c = TeamId::new("C", "M");
        assert!(m.is_pair(&a, &b));
        assert!(m.is_pair(&b, &a));
        assert!(!m.is_pair(&a, &c));
        assert!(m.involves(&a));
        assert!(!m.involves(&c));
    }

    #[test]
    fn test_round_robin_single() {
        let teams = vec![team("A"), team("B"), team("C"), team("D")];
        let matches = round_robin("P", &teams, false);
        assert_eq!(matches.len(), 6);
        assert_eq!(matches[0].id, "P-1");
        assert!(matches.iter().all(|m| m.pool == "P"));
    }

    #[test]
    fn test_round_robin_double_swaps_home() {
        let teams = vec![team("A"), team("B"), team("C")];
        let matches = round_robin("P", &teams, true);
        assert_eq!(matches.len(), 6);
        assert_eq!(matches[0].home.id.name, "A");
        assert_eq!(matches[3].home.id.name, "B");
        assert_eq!(matches[3].away.id.name, "A");
    }
}
