//! Re-resolving stored assignments against the current input.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::{debug, warn};

use super::{SignatureChange, SignatureDiff, SolutionSignature, WarmStartHint, WarmStartRecord};
use crate::models::{Match, MatchStatus, Slot, TeamId};

/// Outcome of adapting a stored record.
#[derive(Debug, Clone)]
pub struct AdaptationReport {
    /// Assignments that still resolve, keyed by current match id.
    pub hint: WarmStartHint,
    /// Stored assignments.
    pub total: usize,
    /// Assignments kept in the hint.
    pub reusable: usize,
    /// Dropped because no current match pairs those teams.
    pub dropped_missing_match: usize,
    /// Dropped because the slot is no longer offered.
    pub dropped_missing_slot: usize,
    /// Stored vs current signature.
    pub diff: SignatureDiff,
}

impl AdaptationReport {
    pub fn change(&self) -> SignatureChange {
        self.diff.change
    }

    /// Fraction of stored assignments kept (1.0 when nothing was stored).
    pub fn reuse_ratio(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.reusable as f64 / self.total as f64
        }
    }
}

/// Maps every stored assignment onto the current matches and slots.
///
/// Pairs are looked up in the stored orientation first, then reversed;
/// each current match takes at most one assignment, so both legs of a
/// double round-robin resolve separately. Slots must match exactly.
/// Cancelled matches are never hinted.
pub fn adapt(
    record: &WarmStartRecord,
    current: &SolutionSignature,
    matches: &[Match],
    slots: &[Slot],
) -> AdaptationReport {
    let diff = record.signature.diff(current);
    if diff.change == SignatureChange::Structural {
        warn!(
            added_teams = diff.added_teams.len(),
            removed_teams = diff.removed_teams.len(),
            added_venues = diff.added_venues.len(),
            removed_venues = diff.removed_venues.len(),
            "input changed structurally since the stored solution"
        );
    }

    let mut by_pair: HashMap<(&TeamId, &TeamId), VecDeque<&str>> = HashMap::new();
    for m in matches.iter().filter(|m| m.status != MatchStatus::Cancelled) {
        by_pair
            .entry((&m.home.id, &m.away.id))
            .or_default()
            .push_back(m.id.as_str());
    }
    let offered: HashSet<&Slot> = slots.iter().collect();

    let mut hint = WarmStartHint::new();
    let mut dropped_missing_match = 0;
    let mut dropped_missing_slot = 0;

    for assignment in &record.assignments {
        let exact = (&assignment.team1, &assignment.team2);
        let reversed = (&assignment.team2, &assignment.team1);
        let key = [exact, reversed]
            .into_iter()
            .find(|key| by_pair.get(key).is_some_and(|ids| !ids.is_empty()));

        let Some(key) = key else {
            dropped_missing_match += 1;
            continue;
        };
        let slot = Slot::new(assignment.week, assignment.time.clone(), assignment.venue.clone());
        if !offered.contains(&slot) {
            dropped_missing_slot += 1;
            continue;
        }
        if let Some(id) = by_pair.get_mut(&key).and_then(VecDeque::pop_front) {
            hint.insert(id, slot);
        }
    }

    let report = AdaptationReport {
        total: record.assignments.len(),
        reusable: hint.len(),
        hint,
        dropped_missing_match,
        dropped_missing_slot,
        diff,
    };
    debug!(
        change = ?report.diff.change,
        total = report.total,
        reusable = report.reusable,
        dropped_missing_match,
        dropped_missing_slot,
        "adapted warm start"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchedulerConfig;
    use crate::models::{round_robin, Team, Venue};
    use crate::scheduler::GreedyOptimizer;
    use crate::warm_start::WarmStartStore;
    use chrono::Utc;
    use std::sync::Arc;

    struct League {
        teams: Vec<Team>,
        venues: Vec<Venue>,
        slots: Vec<Slot>,
        matches: Vec<Match>,
    }

    fn league(names: &[&str]) -> League {
        let teams: Vec<Team> = names
            .iter()
            .map(|n| Team::new(*n, "M").with_pool("P").with_institution(*n))
            .collect();
        let shared: Vec<Arc<Team>> = teams.iter().cloned().map(Arc::new).collect();
        let venues = vec![Venue::new("Gym").with_capacity(2).with_time("18:00").with_time("20:00")];
        let slots = Slot::enumerate(&venues, 1..=8);
        let matches = round_robin("P", &shared, true);
        League {
            teams,
            venues,
            slots,
            matches,
        }
    }

    fn signature(l: &League) -> SolutionSignature {
        SolutionSignature::compute(&l.teams, &l.venues, &l.slots)
    }

    fn solve(l: &League) -> crate::models::Solution {
        GreedyOptimizer::new(SchedulerConfig::default().with_seed(3).with_attempts(3))
            .solve(&l.matches, &l.slots, &l.venues, &[])
            .unwrap()
    }

    #[test]
    fn test_store_roundtrip_unchanged_input() {
        let l = league(&["A", "B", "C", "D"]);
        let solution = solve(&l);

        let dir = tempfile::tempdir().unwrap();
        let store = WarmStartStore::new(dir.path());
        store.save("main", &solution, signature(&l)).unwrap();
        let record = store.try_load_latest("main").unwrap();

        let report = adapt(&record, &signature(&l), &l.matches, &l.slots);
        assert_eq!(report.change(), SignatureChange::None);
        assert_eq!(report.hint.len(), solution.scheduled_count());
        assert_eq!(report.dropped_missing_match, 0);
        assert_eq!(report.dropped_missing_slot, 0);
        assert!((report.reuse_ratio() - 1.0).abs() < 1e-10);

        for m in &solution.scheduled {
            assert_eq!(report.hint.get(&m.id), m.slot.as_ref());
        }
    }

    #[test]
    fn test_renamed_team_drops_its_assignments() {
        let before = league(&["A", "B", "C", "D"]);
        let solution = solve(&before);
        let record = WarmStartRecord::from_solution(&solution, signature(&before), Utc::now());

        let after = league(&["Alpha", "B", "C", "D"]);
        let report = adapt(&record, &signature(&after), &after.matches, &after.slots);

        let renamed = TeamId::new("A", "M");
        let involving = solution.scheduled.iter().filter(|m| m.involves(&renamed)).count();
        assert!(involving > 0);
        assert_eq!(report.change(), SignatureChange::Structural);
        assert_eq!(report.hint.len(), report.total - involving);
        assert_eq!(report.dropped_missing_match, involving);
        assert_eq!(report.diff.removed_teams, vec![renamed]);
    }

    #[test]
    fn test_missing_slot_counted() {
        let l = league(&["A", "B", "C", "D"]);
        let solution = solve(&l);
        let record = WarmStartRecord::from_solution(&solution, signature(&l), Utc::now());

        let late: Vec<Slot> = l.slots.iter().filter(|s| s.time == "20:00").cloned().collect();
        let on_late = record.assignments.iter().filter(|a| a.time == "20:00").count();
        let report = adapt(&record, &signature(&l), &l.matches, &late);

        assert_eq!(report.dropped_missing_slot, record.assignments.len() - on_late);
        assert_eq!(report.reusable, on_late);
    }

    #[test]
    fn test_reversed_orientation_resolves() {
        let a = Arc::new(Team::new("A", "M"));
        let b = Arc::new(Team::new("B", "M"));
        let mut solution = crate::models::Solution::new("greedy");
        solution
            .scheduled
            .push(Match::new("old", Arc::clone(&a), Arc::clone(&b)).with_slot(Slot::new(1, "18:00", "Gym")));
        let sig = SolutionSignature::compute(&[], &[], &[]);
        let record = WarmStartRecord::from_solution(&solution, sig.clone(), Utc::now());

        let current = vec![Match::new("new", b, a)];
        let report = adapt(&record, &sig, &current, &[Slot::new(1, "18:00", "Gym")]);
        assert_eq!(report.hint.get("new"), Some(&Slot::new(1, "18:00", "Gym")));
    }
}
