//! Venue model.
//!
//! Venues host matches. Each venue offers a set of time labels and can
//! host several matches at once up to its capacity, which may be reduced
//! or removed for specific weeks and times.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A venue that hosts matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    /// Unique venue name.
    pub name: String,
    /// Number of concurrent matches (courts, fields).
    pub capacity: u32,
    /// Offered time labels. Empty means every time label is accepted.
    pub times: Vec<String>,
    /// Unavailable weeks → unavailable times. An empty set closes the whole week.
    pub unavailable: BTreeMap<u32, BTreeSet<String>>,
    /// Week → time → reduced capacity.
    pub capacity_overrides: BTreeMap<u32, BTreeMap<String, u32>>,
}

impl Venue {
    /// Creates a venue with capacity 1.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capacity: 1,
            times: Vec::new(),
            unavailable: BTreeMap::new(),
            capacity_overrides: BTreeMap::new(),
        }
    }

    /// Sets the concurrent capacity.
    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Adds an offered time label.
    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.times.push(time.into());
        self
    }

    /// Closes the venue for a whole week.
    pub fn with_unavailable_week(mut self, week: u32) -> Self {
        self.unavailable.insert(week, BTreeSet::new());
        self
    }

    /// Closes the venue at one time of a week.
    pub fn with_unavailable_time(mut self, week: u32, time: impl Into<String>) -> Self {
        self.unavailable.entry(week).or_default().insert(time.into());
        self
    }

    /// Overrides the capacity at a given week and time.
    pub fn with_capacity_override(mut self, week: u32, time: impl Into<String>, capacity: u32) -> Self {
        self.capacity_overrides
            .entry(week)
            .or_default()
            .insert(time.into(), capacity);
        self
    }

    /// Whether the venue offers `time` at all.
    pub fn offers(&self, time: &str) -> bool {
        self.times.is_empty() || self.times.iter().any(|t| t == time)
    }

    /// Whether the venue is closed at `week`/`time`.
    pub fn is_unavailable(&self, week: u32, time: &str) -> bool {
        match self.unavailable.get(&week) {
            None => false,
            Some(times) => times.is_empty() || times.contains(time),
        }
    }

    /// Capacity available at `week`/`time`.
    ///
    /// 0 when closed, else the override if present, else full capacity.
    pub fn effective_capacity(&self, week: u32, time: &str) -> u32 {
        if self.is_unavailable(week, time) {
            return 0;
        }
        self.capacity_overrides
            .get(&week)
            .and_then(|by_time| by_time.get(time))
            .copied()
            .unwrap_or(self.capacity)
    }
}

/// A venue that requires a given institution to take part in every match
/// it hosts (e.g. the host club must supply officials).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceObligation {
    /// Venue the obligation applies to.
    pub venue: String,
    /// Institution that must be present.
    pub institution: String,
    /// Weeks the obligation applies to. Empty means every week.
    pub weeks: BTreeSet<u32>,
}

impl PresenceObligation {
    /// Creates an obligation that applies every week.
    pub fn new(venue: impl Into<String>, institution: impl Into<String>) -> Self {
        Self {
            venue: venue.into(),
            institution: institution.into(),
            weeks: BTreeSet::new(),
        }
    }

    /// Restricts the obligation to a week.
    pub fn with_week(mut self, week: u32) -> Self {
        self.weeks.insert(week);
        self
    }

    /// Whether the obligation is in force at `venue` in `week`.
    pub fn applies(&self, venue: &str, week: u32) -> bool {
        self.venue == venue && (self.weeks.is_empty() || self.weeks.contains(&week))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_venue_builder() {
        let v = Venue::new("Main Gym")
            .with_capacity(3)
            .with_time("18:00")
            .with_time("20:00");

        assert_eq!(v.name, "Main Gym");
        assert_eq!(v.capacity, 3);
        assert!(v.offers("18:00"));
        assert!(!v.offers("19:00"));
    }

    #[test]
    fn test_no_times_offers_everything() {
        let v = Venue::new("Open Field");
        assert!(v.offers("07:00"));
    }

    #[test]
    fn test_effective_capacity() {
        let v = Venue::new("Gym")
            .with_capacity(4)
            .with_unavailable_week(2)
            .with_unavailable_time(3, "18:00")
            .with_capacity_override(4, "18:00", 1);

        assert_eq!(v.effective_capacity(1, "18:00"), 4);
        assert_eq!(v.effective_capacity(2, "20:00"), 0);
        assert_eq!(v.effective_capacity(3, "18:00"), 0);
        assert_eq!(v.effective_capacity(3, "20:00"), 4);
        assert_eq!(v.effective_capacity(4, "18:00"), 1);
        assert_eq!(v.effective_capacity(4, "20:00"), 4);
    }

    #[test]
    fn test_unavailability_beats_override() {
        let v = Venue::new("Gym")
            .with_capacity(2)
            .with_capacity_override(1, "18:00", 5)
            .with_unavailable_time(1, "18:00");
        assert_eq!(v.effective_capacity(1, "18:00"), 0);
    }

    #[test]
    fn test_presence_obligation_weeks() {
        let every = PresenceObligation::new("Gym", "North");
        assert!(every.applies("Gym", 7));
        assert!(!every.applies("Other", 7));

        let some = PresenceObligation::new("Gym", "North").with_week(2);
        assert!(some.applies("Gym", 2));
        assert!(!some.applies("Gym", 3));
    }
}
