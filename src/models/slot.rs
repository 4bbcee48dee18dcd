//! Slot model: a (week, time, venue) resource unit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use super::Venue;

/// A resource slot. Equality is structural.
///
/// Several matches may share one slot up to the venue's effective capacity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    /// Week number (1-based).
    pub week: u32,
    /// Time label, e.g. "18:00".
    pub time: String,
    /// Venue name.
    pub venue: String,
}

impl Slot {
    /// Creates a slot.
    pub fn new(week: u32, time: impl Into<String>, venue: impl Into<String>) -> Self {
        Self {
            week,
            time: time.into(),
            venue: venue.into(),
        }
    }

    /// Builds the candidate pool: every offered time of every venue, for
    /// each week in `weeks`. Venues without explicit times contribute nothing.
    pub fn enumerate(venues: &[Venue], weeks: RangeInclusive<u32>) -> Vec<Slot> {
        let mut slots = Vec::new();
        for week in weeks {
            for venue in venues {
                for time in &venue.times {
                    slots.push(Slot::new(week, time.clone(), venue.name.clone()));
                }
            }
        }
        slots
    }

    /// Start time in minutes since midnight, if the label parses.
    pub fn minutes(&self) -> Option<u32> {
        time_to_minutes(&self.time)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W{} {} @ {}", self.week, self.time, self.venue)
    }
}

/// Parses a time label into minutes since midnight.
///
/// Accepts `HH:MM`, `HHhMM` and a bare `HH`.
pub fn time_to_minutes(label: &str) -> Option<u32> {
    let label = label.trim();
    let (h, m) = match label.find([':', 'h', 'H']) {
        Some(pos) => {
            let minutes = &label[pos + 1..];
            (&label[..pos], if minutes.is_empty() { "0" } else { minutes })
        }
        None => (label, "0"),
    };
    let hours: u32 = h.trim().parse().ok()?;
    let minutes: u32 = m.trim().parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        assert_eq!(Slot::new(1, "18:00", "Gym"), Slot::new(1, "18:00", "Gym"));
        assert_ne!(Slot::new(1, "18:00", "Gym"), Slot::new(2, "18:00", "Gym"));
    }

    #[test]
    fn test_enumerate() {
        let venues = vec![
            Venue::new("A").with_time("18:00").with_time("20:00"),
            Venue::new("B").with_time("19:00"),
            Venue::new("C"),
        ];
        let slots = Slot::enumerate(&venues, 1..=2);
        assert_eq!(slots.len(), 6);
        assert_eq!(slots[0], Slot::new(1, "18:00", "A"));
        assert_eq!(slots[5], Slot::new(2, "19:00", "B"));
    }

    #[test]
    fn test_time_parsing() {
        assert_eq!(time_to_minutes("18:00"), Some(1080));
        assert_eq!(time_to_minutes("18h30"), Some(1110));
        assert_eq!(time_to_minutes("9"), Some(540));
        assert_eq!(time_to_minutes("20h"), Some(1200));
        assert_eq!(time_to_minutes("evening"), None);
        assert_eq!(time_to_minutes("25:00"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Slot::new(3, "18:00", "Gym").to_string(), "W3 18:00 @ Gym");
    }
}
