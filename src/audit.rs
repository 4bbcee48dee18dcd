//! Post-solve auditing.
//!
//! Re-verifies a finished [`Solution`] independently of the optimizer that
//! produced it. Detects:
//! - Matches marked scheduled without a slot
//! - Team unavailability or excluded venues
//! - Closed venues or times a venue does not offer
//! - Slots above venue capacity
//! - Teams playing twice at the same week and time
//! - Teams above the weekly cap
//! - Missing mandatory presence
//! - Optimizer placements before the minimum week
//! - Hard temporal ordering violations
//!
//! Soft penalties are recomputed for reporting only: per-category totals,
//! a time-preference breakdown and per-venue usage. Soft costs never make
//! a solution invalid.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::{info, warn};

use crate::config::{OrderingMode, SchedulerConfig};
use crate::models::{Match, PresenceObligation, Slot, Solution, TeamId, Venue};
use crate::penalty::{self, TimeFit};
use crate::state::SolutionState;

/// Categories of hard violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ViolationKind {
    /// Listed as scheduled but has no slot.
    MissingSlot,
    /// A team is unavailable or excludes the venue.
    TeamUnavailable,
    /// Unknown venue, time not offered, or venue closed.
    VenueUnavailable,
    /// More matches than the venue's effective capacity.
    CapacityExceeded,
    /// A team plays twice at the same week and time.
    DoubleBooking,
    /// A team plays more matches in a week than allowed.
    WeeklyCapExceeded,
    /// A venue's obliged institution is absent.
    MissingPresence,
    /// An optimizer placement before the minimum week.
    BeforeMinimumWeek,
    /// A pairing outside its hard ordering bound.
    OrderingViolated,
}

/// A hard violation found by the auditor.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Matches involved.
    pub match_ids: Vec<String>,
    pub slot: Option<Slot>,
    pub message: String,
}

impl Violation {
    fn new(kind: ViolationKind, match_ids: Vec<String>, slot: Option<Slot>, message: impl Into<String>) -> Self {
        Self {
            kind,
            match_ids,
            slot,
            message: message.into(),
        }
    }
}

/// Weighted soft-penalty totals per category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoftTotals {
    pub time_preference: f64,
    pub rest: f64,
    pub venue_preference: f64,
    pub compaction: f64,
    pub overlap: f64,
    pub round_trip: f64,
    pub ordering: f64,
    pub unscheduled: f64,
}

impl SoftTotals {
    pub fn total(&self) -> f64 {
        self.time_preference
            + self.rest
            + self.venue_preference
            + self.compaction
            + self.overlap
            + self.round_trip
            + self.ordering
            + self.unscheduled
    }
}

/// How scheduled teams fare against their preferred start time.
///
/// Counted per team appearance in optimizer-placed matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimeFitStats {
    pub on_preference: usize,
    pub within_tolerance: usize,
    pub before: usize,
    pub after: usize,
    pub no_preference: usize,
}

impl TimeFitStats {
    fn record(&mut self, fit: TimeFit) {
        match fit {
            TimeFit::OnPreference => self.on_preference += 1,
            TimeFit::WithinTolerance => self.within_tolerance += 1,
            TimeFit::Before(_) => self.before += 1,
            TimeFit::After(_) => self.after += 1,
            TimeFit::NoPreference => self.no_preference += 1,
        }
    }

    /// Appearances outside tolerance.
    pub fn outside_tolerance(&self) -> usize {
        self.before + self.after
    }
}

/// Audit result.
///
/// Soft totals are recomputed with optimizer placements taken in slot
/// order. Rest and round-trip costs depend on which matches were already
/// placed, while the optimizer charged them in its own placement order, so
/// `soft.total()` can differ from the solution score. The difference is
/// reported by [`score_delta`](Self::score_delta).
#[derive(Debug, Clone, Default)]
pub struct AuditReport {
    pub violations: Vec<Violation>,
    pub soft: SoftTotals,
    /// Score recorded by the optimizer.
    pub solver_score: f64,
    pub time_fit: TimeFitStats,
    /// Scheduled matches per venue.
    pub venue_usage: BTreeMap<String, usize>,
    pub scheduled: usize,
    /// Ids of modifiable matches left unplaced.
    pub unscheduled: Vec<String>,
}

impl AuditReport {
    /// Zero hard violations.
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Recomputed soft total minus the optimizer's score.
    pub fn score_delta(&self) -> f64 {
        self.soft.total() - self.solver_score
    }

    pub fn hard_violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Violations of one kind.
    pub fn violations_of(&self, kind: ViolationKind) -> Vec<&Violation> {
        self.violations.iter().filter(|v| v.kind == kind).collect()
    }

    /// Violation count per kind.
    pub fn counts(&self) -> BTreeMap<ViolationKind, usize> {
        let mut counts = BTreeMap::new();
        for v in &self.violations {
            *counts.entry(v.kind).or_insert(0) += 1;
        }
        counts
    }
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} scheduled, {} unscheduled, {} hard violations",
            self.scheduled,
            self.unscheduled.len(),
            self.violations.len()
        )?;
        for (kind, count) in self.counts() {
            writeln!(f, "  {kind:?}: {count}")?;
        }
        writeln!(f, "soft total {:.2} (solver score {:.2})", self.soft.total(), self.solver_score)?;
        write!(
            f,
            "time fit: {} on, {} within, {} before, {} after, {} no preference",
            self.time_fit.on_preference,
            self.time_fit.within_tolerance,
            self.time_fit.before,
            self.time_fit.after,
            self.time_fit.no_preference
        )
    }
}

/// Independent solution checker.
#[derive(Debug, Clone)]
pub struct Auditor {
    config: SchedulerConfig,
    venues: HashMap<String, Venue>,
    obligations: Vec<PresenceObligation>,
}

impl Auditor {
    /// Checks solutions against `config`, the venue table and the obligations.
    pub fn new(config: SchedulerConfig, venues: &[Venue], obligations: &[PresenceObligation]) -> Self {
        Self {
            config,
            venues: venues.iter().map(|v| (v.name.clone(), v.clone())).collect(),
            obligations: obligations.to_vec(),
        }
    }

    /// Audits `solution`.
    pub fn audit(&self, solution: &Solution) -> AuditReport {
        let mut report = AuditReport {
            scheduled: solution.scheduled_count(),
            solver_score: solution.score,
            unscheduled: solution
                .unscheduled
                .iter()
                .filter(|m| m.is_modifiable())
                .map(|m| m.id.clone())
                .collect(),
            ..Default::default()
        };

        let placed: Vec<(&Match, &Slot)> = solution
            .scheduled
            .iter()
            .filter_map(|m| match &m.slot {
                Some(slot) => Some((m, slot)),
                None => {
                    report.violations.push(Violation::new(
                        ViolationKind::MissingSlot,
                        vec![m.id.clone()],
                        None,
                        format!("Match '{}' is scheduled without a slot", m.id),
                    ));
                    None
                }
            })
            .collect();

        for &(m, slot) in &placed {
            self.check_placement(m, slot, &mut report.violations);
            *report.venue_usage.entry(slot.venue.clone()).or_insert(0) += 1;
        }
        self.check_capacity(&placed, &mut report.violations);
        self.check_team_load(&placed, &mut report.violations);
        self.soft_statistics(solution, &placed, &mut report);

        if report.is_valid() {
            info!(
                scheduled = report.scheduled,
                unscheduled = report.unscheduled.len(),
                soft_total = report.soft.total(),
                "solution audit passed"
            );
        } else {
            warn!(
                violations = report.violations.len(),
                scheduled = report.scheduled,
                "solution audit found hard violations"
            );
        }
        report
    }

    /// Checks that depend on one match only.
    fn check_placement(&self, m: &Match, slot: &Slot, out: &mut Vec<Violation>) {
        let ids = || vec![m.id.clone()];

        for team in m.teams() {
            if !team.is_available(slot.week, &slot.time) {
                out.push(Violation::new(
                    ViolationKind::TeamUnavailable,
                    ids(),
                    Some(slot.clone()),
                    format!("{} unavailable at {slot}", team.id),
                ));
            } else if !team.accepts_venue(&slot.venue) {
                out.push(Violation::new(
                    ViolationKind::TeamUnavailable,
                    ids(),
                    Some(slot.clone()),
                    format!("{} excludes venue '{}'", team.id, slot.venue),
                ));
            }
        }

        let open = self.venues.get(&slot.venue).is_some_and(|venue| {
            venue.offers(&slot.time) && venue.effective_capacity(slot.week, &slot.time) > 0
        });
        if !open {
            out.push(Violation::new(
                ViolationKind::VenueUnavailable,
                ids(),
                Some(slot.clone()),
                format!("Venue not available at {slot}"),
            ));
        }

        let institutions = m.institutions();
        for obligation in self.obligations.iter().filter(|o| o.applies(&slot.venue, slot.week)) {
            if !institutions.contains(&obligation.institution.as_str()) {
                out.push(Violation::new(
                    ViolationKind::MissingPresence,
                    ids(),
                    Some(slot.clone()),
                    format!("'{}' must take part in matches at {slot}", obligation.institution),
                ));
            }
        }

        if m.is_modifiable() && slot.week < self.config.min_week {
            out.push(Violation::new(
                ViolationKind::BeforeMinimumWeek,
                ids(),
                Some(slot.clone()),
                format!("Placed in week {} before minimum week {}", slot.week, self.config.min_week),
            ));
        }

        if self.config.ordering.mode == OrderingMode::Hard {
            let excess = penalty::ordering_excess(m, slot.week, &self.config.ordering.constraints);
            if excess > 0 {
                out.push(Violation::new(
                    ViolationKind::OrderingViolated,
                    ids(),
                    Some(slot.clone()),
                    format!("{} is {excess} week(s) outside its ordering bound", m.label()),
                ));
            }
        }
    }

    fn check_capacity(&self, placed: &[(&Match, &Slot)], out: &mut Vec<Violation>) {
        let mut by_slot: BTreeMap<&Slot, Vec<String>> = BTreeMap::new();
        for (m, slot) in placed {
            by_slot.entry(*slot).or_default().push(m.id.clone());
        }
        for (slot, ids) in by_slot {
            let capacity = self
                .venues
                .get(&slot.venue)
                .map_or(0, |v| v.effective_capacity(slot.week, &slot.time));
            if ids.len() > capacity as usize {
                let message = format!("{} matches at {slot}, capacity {capacity}", ids.len());
                out.push(Violation::new(ViolationKind::CapacityExceeded, ids, Some(slot.clone()), message));
            }
        }
    }

    fn check_team_load(&self, placed: &[(&Match, &Slot)], out: &mut Vec<Violation>) {
        let mut at_time: BTreeMap<(&TeamId, u32, &str), Vec<String>> = BTreeMap::new();
        let mut per_week: BTreeMap<(&TeamId, u32), Vec<String>> = BTreeMap::new();
        for (m, slot) in placed {
            for team in m.team_ids() {
                at_time
                    .entry((team, slot.week, slot.time.as_str()))
                    .or_default()
                    .push(m.id.clone());
                per_week.entry((team, slot.week)).or_default().push(m.id.clone());
            }
        }

        for ((team, week, time), ids) in at_time {
            if ids.len() > 1 {
                let message = format!("{team} plays {} matches in week {week} at {time}", ids.len());
                out.push(Violation::new(ViolationKind::DoubleBooking, ids, None, message));
            }
        }
        let cap = self.config.max_matches_per_week as usize;
        for ((team, week), ids) in per_week {
            if ids.len() > cap {
                let message = format!("{team} plays {} matches in week {week}, cap {cap}", ids.len());
                out.push(Violation::new(ViolationKind::WeeklyCapExceeded, ids, None, message));
            }
        }
    }

    /// Recomputes soft costs of optimizer placements in slot order,
    /// on top of the fixed matches.
    fn soft_statistics(&self, solution: &Solution, placed: &[(&Match, &Slot)], report: &mut AuditReport) {
        let config = &self.config;
        let w = &config.weights;
        let mut state = SolutionState::seeded(placed.iter().filter(|(m, _)| !m.is_modifiable()).map(|(m, _)| *m));

        let mut movable: Vec<(&Match, &Slot)> = placed.iter().filter(|(m, _)| m.is_modifiable()).copied().collect();
        movable.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.id.cmp(&b.0.id)));

        let soft = &mut report.soft;
        for (m, slot) in movable {
            for team in m.teams() {
                report
                    .time_fit
                    .record(penalty::classify_time(team, &slot.time, config.time_preference.tolerance_minutes));
            }
            soft.time_preference += w.time_preference * penalty::time_preference(m, slot, &config.time_preference);
            soft.rest += w.rest * penalty::rest_spacing(m, slot, &state, &config.rest_penalties);
            soft.venue_preference += w.venue_preference * penalty::venue_preference(m, slot, &config.venue_rank_bonuses);
            soft.compaction += w.compaction * penalty::compaction(slot, &config.compaction_penalties);
            soft.overlap += w.overlap * penalty::entity_overlap(m, slot, &state, &config.overlap);
            soft.round_trip += w.round_trip * penalty::round_trip(m, slot, &state, &config.round_trip);
            if config.ordering.mode == OrderingMode::Soft {
                soft.ordering += w.ordering
                    * penalty::ordering(m, slot, &config.ordering.constraints, config.ordering.penalty_per_week);
            }
            state.assign(m, slot);
        }

        soft.unscheduled = solution
            .unscheduled
            .iter()
            .filter(|m| m.is_modifiable())
            .map(|m| penalty::unscheduled(m, config))
            .sum();
    }
}
