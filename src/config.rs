//! Scheduler configuration.
//!
//! All penalty coefficients, tables and search settings live here.
//! The struct deserializes from JSON with every field optional
//! (`#[serde(default)]`), and offers builder methods for programmatic use.
//!
//! # Example
//!
//! ```
//! use u_league::config::SchedulerConfig;
//!
//! let config = SchedulerConfig::from_json_str(r#"{ "attempts": 4, "seed": 7 }"#).unwrap();
//! assert_eq!(config.attempts, 4);
//! assert_eq!(config.seed, Some(7));
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::ConfigError;
use crate::models::TeamId;

/// Time-preference penalty coefficients.
///
/// Cost per offending team = multiplier × (distance_minutes / divisor)².
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimePreferenceConfig {
    /// Distance (minutes) that is still free of cost.
    pub tolerance_minutes: u32,
    /// Distance normalizer (minutes).
    pub divisor: f64,
    /// Both offending teams would start before their preference.
    pub both_before_multiplier: f64,
    /// Exactly one offending team would start before its preference.
    pub one_before_multiplier: f64,
    /// Offending teams would only start after their preference.
    pub after_multiplier: f64,
}

impl Default for TimePreferenceConfig {
    fn default() -> Self {
        Self {
            tolerance_minutes: 0,
            divisor: 60.0,
            both_before_multiplier: 8.0,
            one_before_multiplier: 4.0,
            after_multiplier: 1.0,
        }
    }
}

/// Entity-overlap penalty settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlapConfig {
    /// Penalty per conflicting pair of simultaneous matches.
    pub penalty: f64,
    /// Non-simultaneity groups of institution or team names. When empty,
    /// matches conflict when they share an institution.
    pub groups: Vec<BTreeSet<String>>,
}

impl Default for OverlapConfig {
    fn default() -> Self {
        Self {
            penalty: 50.0,
            groups: Vec::new(),
        }
    }
}

/// Double round-robin leg spacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundTripConfig {
    /// Pools played as double round-robin.
    pub double_round_robin_pools: BTreeSet<String>,
    /// Both legs in the same week.
    pub same_week_penalty: f64,
    /// Legs in adjacent weeks.
    pub adjacent_week_penalty: f64,
}

impl Default for RoundTripConfig {
    fn default() -> Self {
        Self {
            double_round_robin_pools: BTreeSet::new(),
            same_week_penalty: 1000.0,
            adjacent_week_penalty: 200.0,
        }
    }
}

/// Whether temporal ordering constraints are hard or soft.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderingMode {
    /// Violations make the assignment illegal.
    #[default]
    Hard,
    /// Violations cost `penalty_per_week` per week outside the bound.
    Soft,
}

/// Side of the bound week a pairing must fall on (bound week included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderingDirection {
    /// `week <= bound`.
    Before,
    /// `week >= bound`.
    After,
}

/// A team pair that must be played before or after a given week.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderingConstraint {
    pub team_a: TeamId,
    pub team_b: TeamId,
    pub week: u32,
    pub direction: OrderingDirection,
}

impl OrderingConstraint {
    /// Pair must be played in `week` or earlier.
    pub fn before(team_a: TeamId, team_b: TeamId, week: u32) -> Self {
        Self {
            team_a,
            team_b,
            week,
            direction: OrderingDirection::Before,
        }
    }

    /// Pair must be played in `week` or later.
    pub fn after(team_a: TeamId, team_b: TeamId, week: u32) -> Self {
        Self {
            team_a,
            team_b,
            week,
            direction: OrderingDirection::After,
        }
    }

    /// Weeks by which `week` misses the bound (0 when satisfied).
    pub fn weeks_outside(&self, week: u32) -> u32 {
        match self.direction {
            OrderingDirection::Before => week.saturating_sub(self.week),
            OrderingDirection::After => self.week.saturating_sub(week),
        }
    }
}

/// Temporal ordering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    pub mode: OrderingMode,
    pub penalty_per_week: f64,
    pub constraints: Vec<OrderingConstraint>,
}

impl Default for OrderingConfig {
    fn default() -> Self {
        Self {
            mode: OrderingMode::Hard,
            penalty_per_week: 100.0,
            constraints: Vec::new(),
        }
    }
}

/// Weight multipliers applied to each soft constraint by the validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftWeights {
    pub time_preference: f64,
    pub rest: f64,
    pub venue_preference: f64,
    pub compaction: f64,
    pub overlap: f64,
    pub round_trip: f64,
    pub ordering: f64,
}

impl Default for SoftWeights {
    fn default() -> Self {
        Self {
            time_preference: 1.0,
            rest: 1.0,
            venue_preference: 1.0,
            compaction: 1.0,
            overlap: 1.0,
            round_trip: 1.0,
            ordering: 1.0,
        }
    }
}

/// Complete scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Independent greedy attempts per run.
    pub attempts: usize,
    /// Base seed. `None` draws one from the thread RNG (and logs it).
    pub seed: Option<u64>,
    /// Run attempts on the rayon pool.
    pub parallel: bool,
    /// Earliest week a modifiable match may be placed in.
    pub min_week: u32,
    /// Per-team, per-week match cap.
    pub max_matches_per_week: u32,
    pub time_preference: TimePreferenceConfig,
    /// Rest penalty by weeks of rest (index 0 = back-to-back weeks).
    pub rest_penalties: Vec<f64>,
    /// Bonus by venue preference rank.
    pub venue_rank_bonuses: Vec<f64>,
    /// Penalty by week (index 0 = week 1); the last entry repeats.
    pub compaction_penalties: Vec<f64>,
    pub overlap: OverlapConfig,
    pub round_trip: RoundTripConfig,
    /// Cost of leaving a normal match unplaced.
    pub unscheduled_penalty: f64,
    /// Institution pairs whose mutual matches are dropped first.
    pub ententes: Vec<(String, String)>,
    /// Cost of leaving an entente match unplaced.
    pub entente_unscheduled_penalty: f64,
    pub ordering: OrderingConfig,
    pub weights: SoftWeights,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            attempts: 10,
            seed: None,
            parallel: true,
            min_week: 1,
            max_matches_per_week: 1,
            time_preference: TimePreferenceConfig::default(),
            rest_penalties: vec![100.0, 30.0, 10.0],
            venue_rank_bonuses: vec![30.0, 20.0, 10.0],
            compaction_penalties: Vec::new(),
            overlap: OverlapConfig::default(),
            round_trip: RoundTripConfig::default(),
            unscheduled_penalty: 10_000.0,
            ententes: Vec::new(),
            entente_unscheduled_penalty: 100.0,
            ordering: OrderingConfig::default(),
            weights: SoftWeights::default(),
        }
    }
}

impl SchedulerConfig {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Sets the number of attempts.
    pub fn with_attempts(mut self, attempts: usize) -> Self {
        self.attempts = attempts;
        self
    }

    /// Sets the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Enables or disables parallel attempts.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the minimum week.
    pub fn with_min_week(mut self, week: u32) -> Self {
        self.min_week = week;
        self
    }

    /// Sets the per-team weekly cap.
    pub fn with_max_matches_per_week(mut self, cap: u32) -> Self {
        self.max_matches_per_week = cap;
        self
    }

    /// Sets the time-preference section.
    pub fn with_time_preference(mut self, time_preference: TimePreferenceConfig) -> Self {
        self.time_preference = time_preference;
        self
    }

    /// Sets the rest table.
    pub fn with_rest_penalties(mut self, table: Vec<f64>) -> Self {
        self.rest_penalties = table;
        self
    }

    /// Sets the venue rank bonuses.
    pub fn with_venue_rank_bonuses(mut self, bonuses: Vec<f64>) -> Self {
        self.venue_rank_bonuses = bonuses;
        self
    }

    /// Sets the compaction table.
    pub fn with_compaction_penalties(mut self, table: Vec<f64>) -> Self {
        self.compaction_penalties = table;
        self
    }

    /// Sets the overlap section.
    pub fn with_overlap(mut self, overlap: OverlapConfig) -> Self {
        self.overlap = overlap;
        self
    }

    /// Declares a pool as double round-robin.
    pub fn with_double_round_robin_pool(mut self, pool: impl Into<String>) -> Self {
        self.round_trip.double_round_robin_pools.insert(pool.into());
        self
    }

    /// Adds an entente between two institutions.
    pub fn with_entente(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.ententes.push((a.into(), b.into()));
        self
    }

    /// Sets the ordering mode.
    pub fn with_ordering_mode(mut self, mode: OrderingMode) -> Self {
        self.ordering.mode = mode;
        self
    }

    /// Adds a temporal ordering constraint.
    pub fn with_ordering_constraint(mut self, constraint: OrderingConstraint) -> Self {
        self.ordering.constraints.push(constraint);
        self
    }

    /// Sets the soft constraint weights.
    pub fn with_weights(mut self, weights: SoftWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Whether two institutions form an entente (order-insensitive).
    pub fn is_entente(&self, a: &str, b: &str) -> bool {
        self.ententes
            .iter()
            .any(|(x, y)| (x == a && y == b) || (x == b && y == a))
    }

    /// Checks the configuration for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if !(self.time_preference.divisor > 0.0) {
            return Err(ConfigError::NonPositiveDivisor(self.time_preference.divisor));
        }
        if self.min_week == 0 {
            return Err(ConfigError::ZeroMinWeek);
        }
        if self.max_matches_per_week == 0 {
            return Err(ConfigError::ZeroWeeklyCap);
        }
        let scalars = [
            ("unscheduled_penalty", self.unscheduled_penalty),
            ("entente_unscheduled_penalty", self.entente_unscheduled_penalty),
            ("overlap.penalty", self.overlap.penalty),
            ("ordering.penalty_per_week", self.ordering.penalty_per_week),
            ("weights.time_preference", self.weights.time_preference),
            ("weights.rest", self.weights.rest),
            ("weights.venue_preference", self.weights.venue_preference),
            ("weights.compaction", self.weights.compaction),
            ("weights.overlap", self.weights.overlap),
            ("weights.round_trip", self.weights.round_trip),
            ("weights.ordering", self.weights.ordering),
        ];
        for (field, value) in scalars {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }
        let tables = [
            ("rest_penalties", &self.rest_penalties),
            ("venue_rank_bonuses", &self.venue_rank_bonuses),
            ("compaction_penalties", &self.compaction_penalties),
        ];
        for (field, table) in tables {
            if let Some(&value) = table.iter().find(|v| !(**v >= 0.0)) {
                return Err(ConfigError::Negative { field, value });
            }
        }
        Ok(())
    }
}
