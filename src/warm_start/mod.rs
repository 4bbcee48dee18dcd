//! Warm starts: reuse a previous run's solution.
//!
//! # Pipeline
//!
//! 1. After a run, [`WarmStartStore::save`] persists the solution with the
//!    [`SolutionSignature`] of its input.
//! 2. On the next run, [`WarmStartStore::try_load_latest`] reads the last
//!    record (any failure degrades to "no warm start").
//! 3. [`adapt`] diffs the signatures and re-resolves every stored
//!    assignment against the current matches and slots, producing a
//!    [`WarmStartHint`] plus an [`AdaptationReport`].
//! 4. The hint seeds an optimizer (greedy pre-seeding or an exact backend).

mod adapt;
mod record;
mod signature;
mod store;

pub use adapt::{adapt, AdaptationReport};
pub use record::{AssignmentRecord, GenerationInfo, WarmStartRecord, SCHEMA_VERSION};
pub use signature::{SignatureChange, SignatureDiff, SolutionSignature};
pub use store::WarmStartStore;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::Slot;

/// Suggested slot per match id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmStartHint {
    assignments: BTreeMap<String, Slot>,
}

impl WarmStartHint {
    /// Empty hint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Suggests `slot` for `match_id`, replacing any earlier suggestion.
    pub fn insert(&mut self, match_id: impl Into<String>, slot: Slot) {
        self.assignments.insert(match_id.into(), slot);
    }

    /// Suggested slot for a match.
    pub fn get(&self, match_id: &str) -> Option<&Slot> {
        self.assignments.get(match_id)
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Suggestions ordered by match id.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Slot)> {
        self.assignments.iter().map(|(id, slot)| (id.as_str(), slot))
    }
}
