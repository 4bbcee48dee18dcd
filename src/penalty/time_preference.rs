//! Time-preference penalty.
//!
//! Each team names one preferred start time. A slot on the preference,
//! or within the tolerance of it, is free. Outside the tolerance the cost
//! grows quadratically with the distance, scaled by a multiplier chosen
//! from how many of the offending teams would start *earlier* than they
//! want: starting early is harder on teams than starting late.

use crate::config::TimePreferenceConfig;
use crate::models::{time_to_minutes, Match, Slot, Team};

/// How a slot's start time relates to one team's preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFit {
    /// No (parseable) preference, or the slot time does not parse.
    NoPreference,
    /// Slot time equals the preferred label.
    OnPreference,
    /// Different, but within tolerance.
    WithinTolerance,
    /// Earlier than preferred by this many minutes (beyond tolerance).
    Before(u32),
    /// Later than preferred by this many minutes (beyond tolerance).
    After(u32),
}

impl TimeFit {
    /// Distance beyond tolerance, if the fit is a violation.
    pub fn violation_minutes(self) -> Option<u32> {
        match self {
            TimeFit::Before(d) | TimeFit::After(d) => Some(d),
            _ => None,
        }
    }
}

/// Classifies `time` against `team`'s preferred time.
pub fn classify(team: &Team, time: &str, tolerance_minutes: u32) -> TimeFit {
    let Some(preferred) = team.preferred_time() else {
        return TimeFit::NoPreference;
    };
    if preferred == time {
        return TimeFit::OnPreference;
    }
    let (Some(want), Some(got)) = (time_to_minutes(preferred), time_to_minutes(time)) else {
        return TimeFit::NoPreference;
    };
    let distance = want.abs_diff(got);
    if distance <= tolerance_minutes {
        TimeFit::WithinTolerance
    } else if got < want {
        TimeFit::Before(distance)
    } else {
        TimeFit::After(distance)
    }
}

/// Multiplier for a match given how many offending teams start early.
pub fn multiplier(config: &TimePreferenceConfig, before_count: usize) -> f64 {
    match before_count {
        0 => config.after_multiplier,
        1 => config.one_before_multiplier,
        _ => config.both_before_multiplier,
    }
}

/// Time-preference cost of placing `m` in `slot`.
pub fn time_preference(m: &Match, slot: &Slot, config: &TimePreferenceConfig) -> f64 {
    let fits = m
        .teams()
        .map(|team| classify(team, &slot.time, config.tolerance_minutes));
    let before_count = fits
        .iter()
        .filter(|fit| matches!(fit, TimeFit::Before(_)))
        .count();
    let factor = multiplier(config, before_count);

    fits.iter()
        .filter_map(|fit| fit.violation_minutes())
        .map(|distance| {
            let scaled = f64::from(distance) / config.divisor;
            factor * scaled * scaled
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn team(name: &str, preferred: Option<&str>) -> Arc<Team> {
        let t = Team::new(name, "M").with_pool("P");
        Arc::new(match preferred {
            Some(p) => t.with_preferred_time(p),
            None => t,
        })
    }

    fn config(tolerance: u32) -> TimePreferenceConfig {
        TimePreferenceConfig {
            tolerance_minutes: tolerance,
            divisor: 60.0,
            both_before_multiplier: 9.0,
            one_before_multiplier: 4.0,
            after_multiplier: 1.0,
        }
    }

    #[test]
    fn test_on_preference_is_free() {
        let m = Match::new("m", team("A", Some("18:00")), team("B", Some("18:00")));
        let cost = time_preference(&m, &Slot::new(1, "18:00", "Gym"), &config(0));
        assert!((cost - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_within_tolerance_is_free() {
        let m = Match::new("m", team("A", Some("18:00")), team("B", None));
        let cost = time_preference(&m, &Slot::new(1, "18:30", "Gym"), &config(30));
        assert!((cost - 0.0).abs() < 1e-10);
    }

    #[test]
    fn test_single_after_uses_low_multiplier() {
        // Preferred 18:00, tolerance 0, offered 20:00, other team indifferent.
        let m = Match::new("m", team("A", Some("18:00")), team("B", None));
        let cost = time_preference(&m, &Slot::new(1, "20:00", "Gym"), &config(0));
        // after multiplier 1.0 × (120 / 60)² = 4.0
        assert!((cost - 4.0).abs() < 1e-10);
        assert!(cost > 0.0);
    }

    #[test]
    fn test_one_before_uses_medium_multiplier() {
        let m = Match::new("m", team("A", Some("20:00")), team("B", Some("17:00")));
        let cost = time_preference(&m, &Slot::new(1, "19:00", "Gym"), &config(0));
        // A early by 60 (before), B late by 120 (after): one before → 4.0
        // 4 × 1² + 4 × 2² = 20
        assert!((cost - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_both_before_uses_high_multiplier() {
        let m = Match::new("m", team("A", Some("20:00")), team("B", Some("21:00")));
        let cost = time_preference(&m, &Slot::new(1, "19:00", "Gym"), &config(0));
        // 9 × 1² + 9 × 2² = 45
        assert!((cost - 45.0).abs() < 1e-10);
    }

    #[test]
    fn test_classify() {
        let t = Team::new("A", "M").with_preferred_time("18:00");
        assert_eq!(classify(&t, "18:00", 0), TimeFit::OnPreference);
        assert_eq!(classify(&t, "18:15", 15), TimeFit::WithinTolerance);
        assert_eq!(classify(&t, "17:00", 15), TimeFit::Before(60));
        assert_eq!(classify(&t, "19:30", 15), TimeFit::After(90));
        assert_eq!(classify(&t, "late", 15), TimeFit::NoPreference);
        assert_eq!(classify(&Team::new("B", "M"), "18:00", 0), TimeFit::NoPreference);
    }
}
