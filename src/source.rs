//! Input collaborators.
//!
//! Loading teams, venues and already fixed matches from spreadsheets or
//! databases happens outside this crate. A loader implements
//! [`ProblemSource`]; every per-team and per-venue constraint
//! (unavailability, preferences, exclusions, capacity overrides) is
//! expected to be merged onto the returned values.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;
use std::sync::Arc;

use crate::error::SourceError;
use crate::models::{round_robin, Match, Slot, Team, Venue};
use crate::scheduler::ScheduleRequest;

/// Supplies the input of an optimization run.
pub trait ProblemSource {
    fn load_teams(&self) -> Result<Vec<Team>, SourceError>;

    fn load_venues(&self) -> Result<Vec<Venue>, SourceError>;

    /// Matches already fixed to a slot (locked or completed).
    fn load_locked_matches(&self) -> Result<Vec<Match>, SourceError>;
}

/// Source backed by vectors, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    pub teams: Vec<Team>,
    pub venues: Vec<Venue>,
    pub locked: Vec<Match>,
}

impl InMemorySource {
    /// Source with no locked matches.
    pub fn new(teams: Vec<Team>, venues: Vec<Venue>) -> Self {
        Self {
            teams,
            venues,
            locked: Vec::new(),
        }
    }

    pub fn with_locked(mut self, locked: Vec<Match>) -> Self {
        self.locked = locked;
        self
    }
}

impl ProblemSource for InMemorySource {
    fn load_teams(&self) -> Result<Vec<Team>, SourceError> {
        Ok(self.teams.clone())
    }

    fn load_venues(&self) -> Result<Vec<Venue>, SourceError> {
        Ok(self.venues.clone())
    }

    fn load_locked_matches(&self) -> Result<Vec<Match>, SourceError> {
        Ok(self.locked.clone())
    }
}

/// Builds a request from a source: round-robin fixtures per pool (double
/// for the listed pools), minus pairings already present among the
/// locked matches, plus the locked matches, over `weeks`.
pub fn build_request<S: ProblemSource + ?Sized>(
    source: &S,
    double_pools: &BTreeSet<String>,
    weeks: RangeInclusive<u32>,
) -> Result<ScheduleRequest, SourceError> {
    let teams = source.load_teams()?;
    let venues = source.load_venues()?;
    let locked = source.load_locked_matches()?;

    let mut pools: BTreeMap<&str, Vec<Arc<Team>>> = BTreeMap::new();
    for team in &teams {
        pools.entry(team.pool.as_str()).or_default().push(Arc::new(team.clone()));
    }

    let mut remaining_locked: Vec<&Match> = locked.iter().collect();
    let mut matches = Vec::new();
    for (pool, members) in &pools {
        for fixture in round_robin(pool, members, double_pools.contains(*pool)) {
            let taken = remaining_locked
                .iter()
                .position(|l| l.pool == fixture.pool && l.home.id == fixture.home.id && l.away.id == fixture.away.id);
            match taken {
                Some(i) => {
                    remaining_locked.swap_remove(i);
                }
                None => matches.push(fixture),
            }
        }
    }

    let slots = Slot::enumerate(&venues, weeks);
    Ok(ScheduleRequest::new(matches, slots, venues).with_matches(locked))
}
