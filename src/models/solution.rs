//! Solution model.
//!
//! A solution is the outcome of one optimizer run: the placed matches,
//! the matches left unplaced, a scalar score and run metadata.
//!
//! # Score convention
//! Scores are **minimized**. A score is the weighted sum of soft
//! penalties of every match placed by the optimizer plus the unscheduled
//! penalty of every modifiable match left unplaced. Venue preference
//! bonuses are subtracted from a fixed base cost. Lower is better.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use super::{Match, TeamId};

/// How an optimizer run ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationStatus {
    /// Every modifiable match was placed.
    Complete,
    /// Some matches are unscheduled.
    Partial,
    /// The run was cancelled; the best completed attempt was kept.
    Interrupted,
    /// Produced by a strategy that does not report a status.
    #[default]
    Unknown,
}

/// Run metadata attached to a solution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolutionMetadata {
    /// Strategy name (e.g. "greedy").
    pub strategy: String,
    /// Wall-clock time of the run.
    pub elapsed: Duration,
    /// Termination status.
    pub status: TerminationStatus,
    /// Base seed of a randomized run.
    pub seed: Option<u64>,
    /// Number of attempts that completed.
    pub attempts: usize,
    /// Free-form extra fields.
    pub extra: BTreeMap<String, String>,
}

/// A scored solution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Solution {
    /// Placed matches, ordered by slot.
    pub scheduled: Vec<Match>,
    /// Matches without a slot.
    pub unscheduled: Vec<Match>,
    /// Minimized score (see module docs).
    pub score: f64,
    /// Run metadata.
    pub metadata: SolutionMetadata,
}

impl Solution {
    /// Creates an empty solution for a strategy.
    pub fn new(strategy: impl Into<String>) -> Self {
        Self {
            metadata: SolutionMetadata {
                strategy: strategy.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Number of placed matches.
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }

    /// Number of unplaced matches.
    pub fn unscheduled_count(&self) -> usize {
        self.unscheduled.len()
    }

    /// Whether every modifiable match was placed.
    pub fn is_complete(&self) -> bool {
        self.unscheduled.iter().all(|m| !m.is_modifiable())
    }

    /// Looks up a match by id in either list.
    pub fn find(&self, match_id: &str) -> Option<&Match> {
        self.scheduled
            .iter()
            .chain(&self.unscheduled)
            .find(|m| m.id == match_id)
    }

    /// Placed matches in a given week.
    pub fn matches_in_week(&self, week: u32) -> Vec<&Match> {
        self.scheduled
            .iter()
            .filter(|m| m.slot.as_ref().is_some_and(|s| s.week == week))
            .collect()
    }

    /// Placed matches involving a team.
    pub fn matches_for_team(&self, team: &TeamId) -> Vec<&Match> {
        self.scheduled.iter().filter(|m| m.involves(team)).collect()
    }

    /// Distinct weeks in use.
    pub fn weeks_used(&self) -> BTreeSet<u32> {
        self.scheduled
            .iter()
            .filter_map(|m| m.slot.as_ref().map(|s| s.week))
            .collect()
    }

    /// Last week in use (0 for an empty solution).
    pub fn last_week(&self) -> u32 {
        self.weeks_used().last().copied().unwrap_or(0)
    }
}
