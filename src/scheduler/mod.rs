//! Optimizers.
//!
//! Every strategy implements [`Optimizer`]: it takes a [`ScheduleRequest`]
//! (matches, candidate slots, venues, presence obligations) plus an
//! optional [`WarmStartHint`] and returns a [`Solution`].
//!
//! - [`GreedyOptimizer`]: randomized multi-attempt greedy, the primary
//!   strategy.
//! - [`FallbackOptimizer`]: wraps an exact backend (any other
//!   `Optimizer`) and falls back to the greedy strategy when the backend
//!   fails or places nothing.
//!
//! # Score convention
//! All strategies minimize: weighted soft penalties of every placed
//! match plus the unscheduled penalty of every modifiable match left
//! unplaced.

mod exact;
mod greedy;

pub use exact::FallbackOptimizer;
pub use greedy::GreedyOptimizer;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ScheduleError;
use crate::models::{Match, PresenceObligation, Slot, Solution, Venue};
use crate::warm_start::WarmStartHint;

/// Input container for one optimization run.
#[derive(Debug, Clone, Default)]
pub struct ScheduleRequest {
    /// Matches to place; locked, completed and cancelled ones included.
    pub matches: Vec<Match>,
    /// Candidate slots.
    pub slots: Vec<Slot>,
    /// Venue table.
    pub venues: Vec<Venue>,
    /// Presence obligations.
    pub obligations: Vec<PresenceObligation>,
}

impl ScheduleRequest {
    /// Creates a new request.
    pub fn new(matches: Vec<Match>, slots: Vec<Slot>, venues: Vec<Venue>) -> Self {
        Self {
            matches,
            slots,
            venues,
            obligations: Vec::new(),
        }
    }

    /// Sets the presence obligations.
    pub fn with_obligations(mut self, obligations: Vec<PresenceObligation>) -> Self {
        self.obligations = obligations;
        self
    }

    /// Adds matches (e.g. locked matches from a collaborator).
    pub fn with_matches(mut self, matches: impl IntoIterator<Item = Match>) -> Self {
        self.matches.extend(matches);
        self
    }

    /// Number of matches an optimizer may place.
    pub fn modifiable_count(&self) -> usize {
        self.matches.iter().filter(|m| m.is_modifiable()).count()
    }
}

/// A scheduling strategy.
pub trait Optimizer: Send + Sync {
    /// Strategy name recorded in the solution metadata.
    fn name(&self) -> &str;

    /// Solves the request, optionally seeded by a warm-start hint.
    fn solve(&self, request: &ScheduleRequest, hint: Option<&WarmStartHint>) -> Result<Solution, ScheduleError>;
}

/// Shared flag asking a running optimizer to stop launching work.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    /// Flag that is not yet cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Team;

    #[test]
    fn test_request_builder() {
        let a = Arc::new(Team::new("A", "M"));
        let b = Arc::new(Team::new("B", "M"));
        let open = Match::new("m1", Arc::clone(&a), Arc::clone(&b));
        let locked = Match::new("m2", b, a).locked_at(Slot::new(1, "18:00", "Gym"));

        let request = ScheduleRequest::new(vec![open], vec![Slot::new(2, "18:00", "Gym")], vec![Venue::new("Gym")])
            .with_matches([locked])
            .with_obligations(vec![PresenceObligation::new("Gym", "Host")]);

        assert_eq!(request.matches.len(), 2);
        assert_eq!(request.modifiable_count(), 1);
        assert_eq!(request.obligations.len(), 1);
    }

    #[test]
    fn test_cancellation_flag_shared() {
        let flag = CancellationFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }
}
