//! Randomized multi-attempt greedy optimizer.
//!
//! # Algorithm
//!
//! 1. Split the input: locked/completed matches with a slot are fixed and
//!    seed the state; cancelled or unplaced non-modifiable matches pass
//!    through untouched; the rest are placed.
//! 2. Build the candidate pool: distinct slots, at or after the minimum
//!    week, with capacity at that week and time, not occupied by any fixed
//!    match.
//! 3. Run independent attempts, each with its own seeded RNG and state:
//!    - commit warm-start hinted assignments whose slot is in the pool and
//!      that are still legal;
//!    - shuffle the remaining matches, then order by entente flag (ententes
//!      last) and priority (highest first), keeping the shuffled order
//!      among equals;
//!    - shuffle the candidate slots once;
//!    - give each match its minimum-penalty legal slot, first seen on ties,
//!      or mark it unscheduled.
//! 4. Keep the attempt with no unplaced matches if any, then the lowest
//!    score, then the lowest attempt index.
//!
//! Slots are never consumed: venue capacity governs how many matches share
//! one.
//!
//! # Complexity
//! O(a · n · s · c) where a=attempts, n=matches, s=candidate slots,
//! c=constraints.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument, trace};

use super::{CancellationFlag, Optimizer, ScheduleRequest};
use crate::config::SchedulerConfig;
use crate::constraints::{Constraint, Validator};
use crate::error::ScheduleError;
use crate::models::{Match, MatchStatus, PresenceObligation, Slot, Solution, TerminationStatus, Venue};
use crate::penalty;
use crate::state::SolutionState;
use crate::warm_start::WarmStartHint;

/// Result of one completed attempt. Indices refer to the modifiable list.
#[derive(Debug, Clone)]
struct Attempt {
    index: usize,
    placed: Vec<(usize, Slot)>,
    unplaced: Vec<usize>,
    score: f64,
}

impl Attempt {
    fn is_complete(&self) -> bool {
        self.unplaced.is_empty()
    }
}

/// Read-only inputs shared by every attempt of a run.
struct RunContext<'a> {
    validator: Validator,
    base_state: SolutionState,
    modifiable: Vec<&'a Match>,
    ententes: Vec<bool>,
    unscheduled_costs: Vec<f64>,
    candidates: Vec<Slot>,
    offered: HashSet<Slot>,
    hint: Option<&'a WarmStartHint>,
    base_seed: u64,
}

/// Randomized multi-attempt greedy optimizer.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use u_league::config::SchedulerConfig;
/// use u_league::models::{Match, Slot, Team, Venue};
/// use u_league::scheduler::GreedyOptimizer;
///
/// let teams: Vec<_> = ["A", "B", "C", "D"]
///     .iter()
///     .map(|n| Arc::new(Team::new(*n, "M").with_pool("P")))
///     .collect();
/// let matches = vec![
///     Match::new("m1", Arc::clone(&teams[0]), Arc::clone(&teams[1])),
///     Match::new("m2", Arc::clone(&teams[2]), Arc::clone(&teams[3])),
/// ];
/// let venues = vec![Venue::new("Gym").with_time("18:00")];
/// let slots = Slot::enumerate(&venues, 1..=2);
///
/// let optimizer = GreedyOptimizer::new(SchedulerConfig::default().with_seed(42));
/// let solution = optimizer.solve(&matches, &slots, &venues, &[]).unwrap();
/// assert_eq!(solution.scheduled_count(), 2);
/// assert!(solution.is_complete());
/// ```
#[derive(Debug, Clone, Default)]
pub struct GreedyOptimizer {
    config: SchedulerConfig,
    hint: Option<WarmStartHint>,
    cancel: CancellationFlag,
    extra: Validator,
}

impl GreedyOptimizer {
    /// Creates an optimizer with the given configuration.
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            hint: None,
            cancel: CancellationFlag::new(),
            extra: Validator::new(),
        }
    }

    /// Pre-seeds every attempt with the hinted assignments whose slot is a
    /// candidate and that are still legal.
    pub fn with_hint(mut self, hint: WarmStartHint) -> Self {
        self.hint = Some(hint);
        self
    }

    /// Observes `flag` for cancellation.
    pub fn with_cancel_flag(mut self, flag: CancellationFlag) -> Self {
        self.cancel = flag;
        self
    }

    /// Evaluates `constraint` after the standard rule set.
    pub fn with_constraint<C: Constraint + 'static>(mut self, constraint: C) -> Self {
        self.extra = std::mem::take(&mut self.extra).with_constraint(constraint);
        self
    }

    /// The configuration in use.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Places `matches` into `slots`.
    ///
    /// Returns a (possibly partial) solution, or an error when the
    /// configuration is invalid, the run was cancelled before any attempt
    /// completed, or no modifiable match could be placed at all.
    pub fn solve(
        &self,
        matches: &[Match],
        slots: &[Slot],
        venues: &[Venue],
        obligations: &[PresenceObligation],
    ) -> Result<Solution, ScheduleError> {
        self.run(matches, slots, venues, obligations, self.hint.as_ref())
    }

    #[instrument(
        skip_all,
        fields(matches = matches.len(), slots = slots.len(), attempts = self.config.attempts)
    )]
    fn run(
        &self,
        matches: &[Match],
        slots: &[Slot],
        venues: &[Venue],
        obligations: &[PresenceObligation],
        hint: Option<&WarmStartHint>,
    ) -> Result<Solution, ScheduleError> {
        let started = Instant::now();
        self.config.validate()?;

        let fixed: Vec<&Match> = matches.iter().filter(|m| is_fixed(m)).collect();
        let modifiable: Vec<&Match> = matches.iter().filter(|m| m.is_modifiable()).collect();

        if modifiable.is_empty() {
            info!(fixed = fixed.len(), "nothing to place");
            let mut solution = self.assemble(matches, &HashMap::new(), 0.0);
            solution.metadata.status = TerminationStatus::Complete;
            solution.metadata.elapsed = started.elapsed();
            return Ok(solution);
        }

        let base_state = SolutionState::seeded(fixed.iter().copied());
        let candidates = candidate_slots(slots, venues, &base_state, self.config.min_week);
        let base_seed = match self.config.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::rng().random::<u64>();
                info!(seed, "no seed configured, drew one");
                seed
            }
        };

        info!(
            modifiable = modifiable.len(),
            fixed = fixed.len(),
            candidates = candidates.len(),
            seed = base_seed,
            hinted = hint.map_or(0, WarmStartHint::len),
            "starting greedy run"
        );

        let offered: HashSet<Slot> = candidates.iter().cloned().collect();
        let ctx = RunContext {
            validator: Validator::standard(&self.config, venues, obligations).extend(self.extra.clone()),
            base_state,
            ententes: modifiable.iter().map(|m| penalty::is_entente(m, &self.config)).collect(),
            unscheduled_costs: modifiable.iter().map(|m| penalty::unscheduled(m, &self.config)).collect(),
            modifiable,
            candidates,
            offered,
            hint,
            base_seed,
        };

        let attempts = self.config.attempts;
        let completed: Vec<Attempt> = if self.config.parallel {
            (0..attempts)
                .into_par_iter()
                .filter_map(|i| self.attempt(&ctx, i))
                .collect()
        } else {
            (0..attempts).filter_map(|i| self.attempt(&ctx, i)).collect()
        };

        let best = completed
            .iter()
            .min_by(|a, b| {
                (!a.is_complete())
                    .cmp(&!b.is_complete())
                    .then(a.score.total_cmp(&b.score))
                    .then(a.index.cmp(&b.index))
            })
            .ok_or(ScheduleError::Cancelled)?;

        if best.placed.is_empty() {
            return Err(ScheduleError::NoSolutionFound {
                modifiable: ctx.modifiable.len(),
            });
        }

        let placements: HashMap<usize, &Slot> = best.placed.iter().map(|(i, slot)| (*i, slot)).collect();
        let mut solution = self.assemble(matches, &placements, best.score);
        solution.metadata.seed = Some(base_seed);
        solution.metadata.attempts = completed.len();
        solution.metadata.status = if completed.len() < attempts {
            TerminationStatus::Interrupted
        } else if best.is_complete() {
            TerminationStatus::Complete
        } else {
            TerminationStatus::Partial
        };
        solution
            .metadata
            .extra
            .insert("best_attempt".into(), best.index.to_string());
        solution
            .metadata
            .extra
            .insert("candidate_slots".into(), ctx.candidates.len().to_string());
        solution.metadata.elapsed = started.elapsed();

        info!(
            scheduled = solution.scheduled_count(),
            unscheduled = solution.unscheduled_count(),
            score = solution.score,
            best_attempt = best.index,
            elapsed_ms = solution.metadata.elapsed.as_millis() as u64,
            "greedy run finished"
        );
        Ok(solution)
    }

    /// Runs one attempt; `None` when cancelled midway.
    fn attempt(&self, ctx: &RunContext<'_>, index: usize) -> Option<Attempt> {
        if self.cancel.is_cancelled() {
            return None;
        }
        let mut rng = ChaCha8Rng::seed_from_u64(ctx.base_seed.wrapping_add(index as u64));
        let mut state = ctx.base_state.clone();
        let mut placed = Vec::new();
        let mut unplaced = Vec::new();
        let mut score = 0.0;

        let mut pending: Vec<usize> = (0..ctx.modifiable.len()).collect();
        if let Some(hint) = ctx.hint {
            pending.retain(|&i| {
                let m = ctx.modifiable[i];
                let Some(slot) = hint.get(&m.id).filter(|slot| ctx.offered.contains(*slot)) else {
                    return true;
                };
                let (ok, cost) = ctx.validator.validate(m, slot, &state);
                if !ok {
                    return true;
                }
                state.assign(m, slot);
                score += cost;
                placed.push((i, slot.clone()));
                false
            });
        }

        pending.shuffle(&mut rng);
        pending.sort_by_key(|&i| (ctx.ententes[i], Reverse(ctx.modifiable[i].priority)));

        let mut slot_order: Vec<usize> = (0..ctx.candidates.len()).collect();
        slot_order.shuffle(&mut rng);

        for i in pending {
            if self.cancel.is_cancelled() {
                return None;
            }
            let m = ctx.modifiable[i];
            let mut best: Option<(usize, f64)> = None;
            for &s in &slot_order {
                let (ok, cost) = ctx.validator.validate(m, &ctx.candidates[s], &state);
                if ok && best.map_or(true, |(_, lowest)| cost < lowest) {
                    best = Some((s, cost));
                }
            }
            match best {
                Some((s, cost)) => {
                    let slot = &ctx.candidates[s];
                    state.assign(m, slot);
                    score += cost;
                    placed.push((i, slot.clone()));
                }
                None => {
                    trace!(match_id = %m.id, pairing = %m.label(), "no slot available");
                    score += ctx.unscheduled_costs[i];
                    unplaced.push(i);
                }
            }
        }

        debug!(
            attempt = index,
            placed = placed.len(),
            unplaced = unplaced.len(),
            score,
            "attempt finished"
        );
        Some(Attempt {
            index,
            placed,
            unplaced,
            score,
        })
    }

    /// Builds the solution in input order, then sorts the scheduled list.
    fn assemble(
        &self,
        matches: &[Match],
        placements: &HashMap<usize, &Slot>,
        score: f64,
    ) -> Solution {
        let mut solution = Solution::new(self.name());
        solution.score = score;
        let mut next_modifiable = 0usize;

        for m in matches {
            if m.is_modifiable() {
                let index = next_modifiable;
                next_modifiable += 1;
                match placements.get(&index) {
                    Some(&slot) => solution
                        .scheduled
                        .push(m.clone().with_slot(slot.clone()).with_status(MatchStatus::Scheduled)),
                    None => {
                        let mut open = m.clone();
                        open.slot = None;
                        open.status = MatchStatus::Unscheduled;
                        solution.unscheduled.push(open);
                    }
                }
            } else if is_fixed(m) {
                solution.scheduled.push(m.clone());
            } else {
                solution.unscheduled.push(m.clone());
            }
        }

        solution.scheduled.sort_by(|a, b| a.slot.cmp(&b.slot).then_with(|| a.id.cmp(&b.id)));
        solution
    }
}

impl Optimizer for GreedyOptimizer {
    fn name(&self) -> &str {
        "greedy"
    }

    fn solve(&self, request: &ScheduleRequest, hint: Option<&WarmStartHint>) -> Result<Solution, ScheduleError> {
        self.run(
            &request.matches,
            &request.slots,
            &request.venues,
            &request.obligations,
            hint.or(self.hint.as_ref()),
        )
    }
}

/// Non-modifiable, already placed and not cancelled.
fn is_fixed(m: &Match) -> bool {
    !m.is_modifiable() && m.slot.is_some() && m.status != MatchStatus::Cancelled
}

/// Distinct slots, first occurrence first, that are at or after
/// `min_week`, have capacity at that week and time, and hold no fixed match.
fn candidate_slots(slots: &[Slot], venues: &[Venue], seeded: &SolutionState, min_week: u32) -> Vec<Slot> {
    let capacity: HashMap<&str, &Venue> = venues.iter().map(|v| (v.name.as_str(), v)).collect();
    let mut seen = HashSet::new();
    slots
        .iter()
        .filter(|slot| slot.week >= min_week)
        .filter(|slot| seeded.occupancy(slot) == 0)
        .filter(|slot| {
            capacity
                .get(slot.venue.as_str())
                .is_some_and(|venue| venue.effective_capacity(slot.week, &slot.time) > 0)
        })
        .filter(|slot| seen.insert((*slot).clone()))
        .cloned()
        .collect()
}
