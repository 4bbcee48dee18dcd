//! Structural fingerprint of a problem's input.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::{Slot, Team, TeamId, Venue};

const FIELD: &[u8] = &[0x1f];
const RECORD: &[u8] = &[0x1e];

/// Fingerprint of the teams, venues and slots a solution was built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionSignature {
    /// SHA-256 (hex) of the team table, teams ordered by id.
    pub teams_hash: String,
    /// SHA-256 (hex) of the venue table, venues ordered by name.
    pub venues_hash: String,
    pub team_count: usize,
    pub venue_count: usize,
    /// Distinct candidate slots.
    pub slot_count: usize,
    /// Distinct weeks among the slots.
    pub week_count: usize,
    /// Sorted team identities.
    pub team_ids: Vec<TeamId>,
    /// Sorted venue names.
    pub venue_names: Vec<String>,
}

/// How much the input changed between two signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SignatureChange {
    /// Identical input.
    None,
    /// Same teams, venues and slot grid; only attributes changed
    /// (preferences, unavailability, capacities).
    Cosmetic,
    /// Teams or venues added/removed, or the slot grid changed.
    Structural,
}

/// Detailed comparison of a stored signature against the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureDiff {
    pub change: SignatureChange,
    pub added_teams: Vec<TeamId>,
    pub removed_teams: Vec<TeamId>,
    pub added_venues: Vec<String>,
    pub removed_venues: Vec<String>,
}

impl SolutionSignature {
    /// Fingerprints the given input.
    pub fn compute(teams: &[Team], venues: &[Venue], slots: &[Slot]) -> Self {
        let mut sorted_teams: Vec<&Team> = teams.iter().collect();
        sorted_teams.sort_by(|a, b| a.id.cmp(&b.id));
        let mut sorted_venues: Vec<&Venue> = venues.iter().collect();
        sorted_venues.sort_by(|a, b| a.name.cmp(&b.name));

        let distinct_slots: BTreeSet<&Slot> = slots.iter().collect();
        let weeks: BTreeSet<u32> = slots.iter().map(|s| s.week).collect();

        let team_ids: Vec<TeamId> = sorted_teams
            .iter()
            .map(|t| t.id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let venue_names: Vec<String> = sorted_venues
            .iter()
            .map(|v| v.name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            teams_hash: hash_teams(&sorted_teams),
            venues_hash: hash_venues(&sorted_venues),
            team_count: team_ids.len(),
            venue_count: venue_names.len(),
            slot_count: distinct_slots.len(),
            week_count: weeks.len(),
            team_ids,
            venue_names,
        }
    }

    /// Compares `self` (stored) against `current`.
    pub fn diff(&self, current: &SolutionSignature) -> SignatureDiff {
        let before: BTreeSet<&TeamId> = self.team_ids.iter().collect();
        let after: BTreeSet<&TeamId> = current.team_ids.iter().collect();
        let venues_before: BTreeSet<&String> = self.venue_names.iter().collect();
        let venues_after: BTreeSet<&String> = current.venue_names.iter().collect();

        let added_teams: Vec<TeamId> = after.difference(&before).map(|t| (*t).clone()).collect();
        let removed_teams: Vec<TeamId> = before.difference(&after).map(|t| (*t).clone()).collect();
        let added_venues: Vec<String> = venues_after.difference(&venues_before).map(|v| (*v).clone()).collect();
        let removed_venues: Vec<String> = venues_before.difference(&venues_after).map(|v| (*v).clone()).collect();

        let structural = !added_teams.is_empty()
            || !removed_teams.is_empty()
            || !added_venues.is_empty()
            || !removed_venues.is_empty()
            || self.slot_count != current.slot_count
            || self.week_count != current.week_count;

        let change = if structural {
            SignatureChange::Structural
        } else if self.teams_hash != current.teams_hash || self.venues_hash != current.venues_hash {
            SignatureChange::Cosmetic
        } else {
            SignatureChange::None
        };

        SignatureDiff {
            change,
            added_teams,
            removed_teams,
            added_venues,
            removed_venues,
        }
    }
}

fn hash_teams(teams: &[&Team]) -> String {
    let mut hasher = Sha256::new();
    for team in teams {
        hasher.update(team.id.name.as_bytes());
        hasher.update(FIELD);
        hasher.update(team.id.gender.as_bytes());
        hasher.update(FIELD);
        hasher.update(team.institution.as_bytes());
        hasher.update(FIELD);
        hasher.update(team.pool.as_bytes());
        hasher.update(FIELD);
        for time in &team.preferred_times {
            hasher.update(time.as_bytes());
            hasher.update(b",");
        }
        hasher.update(FIELD);
        for venue in &team.preferred_venues {
            hasher.update(venue.as_deref().unwrap_or("-").as_bytes());
            hasher.update(b",");
        }
        hasher.update(FIELD);
        for (week, times) in &team.unavailable {
            hasher.update(week.to_le_bytes());
            for time in times {
                hasher.update(time.as_bytes());
                hasher.update(b",");
            }
            hasher.update(b";");
        }
        hasher.update(FIELD);
        for venue in &team.excluded_venues {
            hasher.update(venue.as_bytes());
            hasher.update(b",");
        }
        hasher.update(RECORD);
    }
    format!("{:x}", hasher.finalize())
}

fn hash_venues(venues: &[&Venue]) -> String {
    let mut hasher = Sha256::new();
    for venue in venues {
        hasher.update(venue.name.as_bytes());
        hasher.update(FIELD);
        hasher.update(venue.capacity.to_le_bytes());
        hasher.update(FIELD);
        for time in &venue.times {
            hasher.update(time.as_bytes());
            hasher.update(b",");
        }
        hasher.update(FIELD);
        for (week, times) in &venue.unavailable {
            hasher.update(week.to_le_bytes());
            for time in times {
                hasher.update(time.as_bytes());
                hasher.update(b",");
            }
            hasher.update(b";");
        }
        hasher.update(FIELD);
        for (week, by_time) in &venue.capacity_overrides {
            hasher.update(week.to_le_bytes());
            for (time, capacity) in by_time {
                hasher.update(time.as_bytes());
                hasher.update(capacity.to_le_bytes());
            }
            hasher.update(b";");
        }
        hasher.update(RECORD);
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> (Vec<Team>, Vec<Venue>, Vec<Slot>) {
        let teams = vec![
            Team::new("B", "M").with_preferred_time("18:00"),
            Team::new("A", "M"),
            Team::new("A", "F"),
        ];
        let venues = vec![Venue::new("Gym").with_time("18:00"), Venue::new("Annex").with_time("20:00")];
        let slots = Slot::enumerate(&venues, 1..=3);
        (teams, venues, slots)
    }

    #[test]
    fn test_compute_is_order_independent() {
        let (mut teams, mut venues, slots) = input();
        let first = SolutionSignature::compute(&teams, &venues, &slots);
        teams.reverse();
        venues.reverse();
        let second = SolutionSignature::compute(&teams, &venues, &slots);
        assert_eq!(first, second);
        assert_eq!(first.team_count, 3);
        assert_eq!(first.venue_count, 2);
        assert_eq!(first.slot_count, 6);
        assert_eq!(first.week_count, 3);
        assert_eq!(first.team_ids[0], TeamId::new("A", "F"));
        assert_eq!(first.teams_hash.len(), 64);
    }

    #[test]
    fn test_diff_none() {
        let (teams, venues, slots) = input();
        let sig = SolutionSignature::compute(&teams, &venues, &slots);
        assert_eq!(sig.diff(&sig).change, SignatureChange::None);
    }

    #[test]
    fn test_diff_cosmetic() {
        let (mut teams, venues, slots) = input();
        let stored = SolutionSignature::compute(&teams, &venues, &slots);
        teams[1] = Team::new("A", "M").with_unavailable_week(2);
        let current = SolutionSignature::compute(&teams, &venues, &slots);
        let diff = stored.diff(&current);
        assert_eq!(diff.change, SignatureChange::Cosmetic);
        assert!(diff.added_teams.is_empty());
    }

    #[test]
    fn test_diff_structural() {
        let (mut teams, venues, slots) = input();
        let stored = SolutionSignature::compute(&teams, &venues, &slots);
        teams[0] = Team::new("Bee", "M");
        let current = SolutionSignature::compute(&teams, &venues, &slots);
        let diff = stored.diff(&current);
        assert_eq!(diff.change, SignatureChange::Structural);
        assert_eq!(diff.added_teams, vec![TeamId::new("Bee", "M")]);
        assert_eq!(diff.removed_teams, vec![TeamId::new("B", "M")]);

        let fewer_weeks = SolutionSignature::compute(&teams, &venues, &slots[..2]);
        assert_eq!(current.diff(&fewer_weeks).change, SignatureChange::Structural);
    }
}
