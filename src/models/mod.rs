//! League scheduling domain models.
//!
//! Value types describing what is scheduled (matches between teams),
//! where and when it can happen (venues and slots), and the outcome of
//! a run (solutions).
//!
//! # Domain Mappings
//!
//! | u-league | Generic assignment | Example |
//! |----------|--------------------|---------|
//! | Match | Task | Lions vs Tigers |
//! | Slot | Resource × time unit | Week 3, 18:00, Main Gym |
//! | Venue | Resource with capacity | Main Gym (2 courts) |
//! | Solution | Assignment plan | Season calendar |

mod fixture;
mod slot;
mod solution;
mod team;
mod venue;

pub use fixture::{round_robin, Match, MatchStatus};
pub use slot::{time_to_minutes, Slot};
pub use solution::{Solution, SolutionMetadata, TerminationStatus};
pub use team::{Team, TeamId};
pub use venue::{PresenceObligation, Venue};
