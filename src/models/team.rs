//! Team model.
//!
//! A team is one side of a match. Its identity is the composite
//! `(name, gender)`: clubs commonly field a men's and a women's team
//! under the same name, so the name alone is not a key.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Composite team identity.
///
/// Used everywhere a team is looked up (state tables, warm-start records,
/// ordering constraints) instead of ad hoc string concatenation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId {
    /// Team name.
    pub name: String,
    /// Gender tag (e.g. "M", "F", "X").
    pub gender: String,
}

impl TeamId {
    /// Creates a team identity.
    pub fn new(name: impl Into<String>, gender: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gender: gender.into(),
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.gender)
    }
}

/// A team taking part in the league.
///
/// Equality and hashing use [`TeamId`] only; the remaining fields are
/// scheduling attributes merged in by the input loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Composite identity.
    pub id: TeamId,
    /// Home institution (club, school).
    pub institution: String,
    /// Pool (group) the team plays in.
    pub pool: String,
    /// Preferred time labels, most preferred first.
    pub preferred_times: Vec<String>,
    /// Ranked venue preferences. `None` marks a gap: no preference at that rank.
    pub preferred_venues: Vec<Option<String>>,
    /// Unavailable weeks → unavailable time labels. An empty set blocks the whole week.
    pub unavailable: BTreeMap<u32, BTreeSet<String>>,
    /// Venues the team cannot play at.
    pub excluded_venues: BTreeSet<String>,
}

impl PartialEq for Team {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Team {}

impl Hash for Team {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Team {
    /// Creates a team with the given identity.
    pub fn new(name: impl Into<String>, gender: impl Into<String>) -> Self {
        Self {
            id: TeamId::new(name, gender),
            institution: String::new(),
            pool: String::new(),
            preferred_times: Vec::new(),
            preferred_venues: Vec::new(),
            unavailable: BTreeMap::new(),
            excluded_venues: BTreeSet::new(),
        }
    }

    /// Sets the home institution.
    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = institution.into();
        self
    }

    /// Sets the pool.
    pub fn with_pool(mut self, pool: impl Into<String>) -> Self {
        self.pool = pool.into();
        self
    }

    /// Appends a preferred time label.
    pub fn with_preferred_time(mut self, time: impl Into<String>) -> Self {
        self.preferred_times.push(time.into());
        self
    }

    /// Sets the venue preference at `rank` (0-based), leaving gaps before it.
    pub fn with_venue_preference(mut self, rank: usize, venue: impl Into<String>) -> Self {
        if self.preferred_venues.len() <= rank {
            self.preferred_venues.resize(rank + 1, None);
        }
        self.preferred_venues[rank] = Some(venue.into());
        self
    }

    /// Marks a whole week as unavailable.
    pub fn with_unavailable_week(mut self, week: u32) -> Self {
        self.unavailable.insert(week, BTreeSet::new());
        self
    }

    /// Marks a single time in a week as unavailable.
    pub fn with_unavailable_time(mut self, week: u32, time: impl Into<String>) -> Self {
        self.unavailable.entry(week).or_default().insert(time.into());
        self
    }

    /// Forbids a venue for this team.
    pub fn with_excluded_venue(mut self, venue: impl Into<String>) -> Self {
        self.excluded_venues.insert(venue.into());
        self
    }

    /// The single preferred time used by the time-preference penalty.
    pub fn preferred_time(&self) -> Option<&str> {
        self.preferred_times.first().map(String::as_str)
    }

    /// Whether the team can play in `week` at `time`.
    pub fn is_available(&self, week: u32, time: &str) -> bool {
        match self.unavailable.get(&week) {
            None => true,
            Some(times) => !times.is_empty() && !times.contains(time),
        }
    }

    /// Whether the team may play at `venue`.
    pub fn accepts_venue(&self, venue: &str) -> bool {
        !self.excluded_venues.contains(venue)
    }

    /// Rank of `venue` in the preference list (first occurrence wins).
    pub fn venue_rank(&self, venue: &str) -> Option<usize> {
        self.preferred_venues
            .iter()
            .position(|v| v.as_deref() == Some(venue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_team_builder() {
        let team = Team::new("Lions", "F")
            .with_institution("North High")
            .with_pool("A")
            .with_preferred_time("18:00")
            .with_preferred_time("19:00")
            .with_excluded_venue("Far Gym");

        assert_eq!(team.id, TeamId::new("Lions", "F"));
        assert_eq!(team.institution, "North High");
        assert_eq!(team.pool, "A");
        assert_eq!(team.preferred_time(), Some("18:00"));
        assert!(!team.accepts_venue("Far Gym"));
        assert!(team.accepts_venue("Main Gym"));
    }

    #[test]
    fn test_identity_is_name_and_gender() {
        let men = Team::new("Lions", "M").with_institution("North");
        let women = Team::new("Lions", "F").with_institution("North");
        let men_again = Team::new("Lions", "M").with_pool("other");

        assert_ne!(men, women);
        assert_eq!(men, men_again);

        let set: HashSet<Team> = [men, women, men_again].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_venue_ranks_with_gaps() {
        let team = Team::new("T", "M")
            .with_venue_preference(0, "Main")
            .with_venue_preference(2, "Annex");

        assert_eq!(team.preferred_venues.len(), 3);
        assert_eq!(team.preferred_venues[1], None);
        assert_eq!(team.venue_rank("Main"), Some(0));
        assert_eq!(team.venue_rank("Annex"), Some(2));
        assert_eq!(team.venue_rank("Other"), None);
    }

    #[test]
    fn test_availability() {
        let team = Team::new("T", "M")
            .with_unavailable_week(3)
            .with_unavailable_time(5, "18:00");

        assert!(team.is_available(1, "18:00"));
        assert!(!team.is_available(3, "18:00"));
        assert!(!team.is_available(3, "20:00"));
        assert!(!team.is_available(5, "18:00"));
        assert!(team.is_available(5, "20:00"));
    }

    #[test]
    fn test_team_id_display() {
        assert_eq!(TeamId::new("Lions", "F").to_string(), "Lions (F)");
    }
}
