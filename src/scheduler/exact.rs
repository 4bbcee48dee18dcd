//! Exact-backend wrapper with greedy fallback.
//!
//! An exact strategy (CP/ILP model delegated to an external solver) is any
//! [`Optimizer`] honoring the hard constraints and approximating the same
//! objective. This crate ships no backend; [`FallbackOptimizer`] runs one
//! and takes over with the [`GreedyOptimizer`] when it errors or places
//! no match.

use tracing::{info, warn};

use super::{GreedyOptimizer, Optimizer, ScheduleRequest};
use crate::error::ScheduleError;
use crate::models::Solution;
use crate::warm_start::WarmStartHint;

/// Runs `primary`, falling back to greedy on failure.
#[derive(Debug, Clone)]
pub struct FallbackOptimizer<E> {
    primary: E,
    fallback: GreedyOptimizer,
}

impl<E: Optimizer> FallbackOptimizer<E> {
    /// Wraps `primary`, with `fallback` taking over when it fails.
    pub fn new(primary: E, fallback: GreedyOptimizer) -> Self {
        Self { primary, fallback }
    }

    /// The wrapped exact backend.
    pub fn primary(&self) -> &E {
        &self.primary
    }
}

impl<E: Optimizer> Optimizer for FallbackOptimizer<E> {
    fn name(&self) -> &str {
        self.primary.name()
    }

    fn solve(&self, request: &ScheduleRequest, hint: Option<&WarmStartHint>) -> Result<Solution, ScheduleError> {
        match self.primary.solve(request, hint) {
            Ok(solution) if solution.scheduled_count() > 0 || request.modifiable_count() == 0 => {
                info!(strategy = self.primary.name(), score = solution.score, "exact backend succeeded");
                Ok(solution)
            }
            Ok(_) => {
                warn!(
                    strategy = self.primary.name(),
                    "exact backend placed nothing, falling back to greedy"
                );
                Optimizer::solve(&self.fallback, request, hint)
            }
            Err(err) => {
                warn!(
                    strategy = self.primary.name(),
                    error = %err,
                    "exact backend failed, falling back to greedy"
                );
                Optimizer::solve(&self.fallback, request, hint)
            }
        }
    }
}
