//! Persisted warm-start record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SolutionSignature;
use crate::models::{Solution, TeamId, TerminationStatus};

/// Current record layout. Loaders reject any other version.
pub const SCHEMA_VERSION: u32 = 1;

/// Metadata about the run that produced the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationInfo {
    pub timestamp: DateTime<Utc>,
    pub strategy: String,
    pub status: TerminationStatus,
    pub score: f64,
    pub scheduled: usize,
    pub unscheduled: usize,
}

/// One stored placement, keyed by the teams rather than a match id so it
/// survives regenerated fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub team1: TeamId,
    pub team2: TeamId,
    pub week: u32,
    pub time: String,
    pub venue: String,
}

/// A solution as persisted by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarmStartRecord {
    pub schema_version: u32,
    pub generated: GenerationInfo,
    pub signature: SolutionSignature,
    pub assignments: Vec<AssignmentRecord>,
}

impl WarmStartRecord {
    /// Captures every placed match of `solution`.
    pub fn from_solution(solution: &Solution, signature: SolutionSignature, timestamp: DateTime<Utc>) -> Self {
        let assignments = solution
            .scheduled
            .iter()
            .filter_map(|m| {
                m.slot.as_ref().map(|slot| AssignmentRecord {
                    team1: m.home.id.clone(),
                    team2: m.away.id.clone(),
                    week: slot.week,
                    time: slot.time.clone(),
                    venue: slot.venue.clone(),
                })
            })
            .collect();

        Self {
            schema_version: SCHEMA_VERSION,
            generated: GenerationInfo {
                timestamp,
                strategy: solution.metadata.strategy.clone(),
                status: solution.metadata.status,
                score: solution.score,
                scheduled: solution.scheduled_count(),
                unscheduled: solution.unscheduled_count(),
            },
            signature,
            assignments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Match, Slot, Team};
    use std::sync::Arc;

    #[test]
    fn test_from_solution_skips_unplaced() {
        let a = Arc::new(Team::new("A", "M"));
        let b = Arc::new(Team::new("B", "F"));
        let mut solution = Solution::new("greedy");
        solution.scheduled.push(
            Match::new("m1", Arc::clone(&a), Arc::clone(&b)).with_slot(Slot::new(2, "18:00", "Gym")),
        );
        solution.unscheduled.push(Match::new("m2", b, a));
        let signature = SolutionSignature::compute(&[], &[], &[]);

        let record = WarmStartRecord::from_solution(&solution, signature, Utc::now());
        assert_eq!(record.schema_version, SCHEMA_VERSION);
        assert_eq!(record.generated.scheduled, 1);
        assert_eq!(record.generated.unscheduled, 1);
        assert_eq!(record.assignments.len(), 1);
        assert_eq!(record.assignments[0].team2, TeamId::new("B", "F"));
        assert_eq!(record.assignments[0].venue, "Gym");

        let json = serde_json::to_string(&record).unwrap();
        let back: WarmStartRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
