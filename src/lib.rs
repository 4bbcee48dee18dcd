//! League calendar engine.
//!
//! Assigns matches (pairings of two teams) to slots (week × time × venue)
//! under hard constraints, minimizing a weighted sum of soft penalties.
//! The problem is a generic constrained assignment: tasks, resource-time
//! slots with capacity, per-task eligibility and a multi-term objective.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Team`, `TeamId`, `Venue`, `Slot`, `Match`,
//!   `Solution`, plus round-robin fixture and slot generators
//! - **`config`**: `SchedulerConfig` with penalty tables and search settings
//! - **`state`**: Per-attempt occupancy and usage tables
//! - **`constraints`**: `Constraint` trait, `Validator`, built-in rules
//! - **`penalty`**: Pure soft-penalty calculators
//! - **`scheduler`**: `Optimizer` trait, randomized greedy, exact fallback
//! - **`warm_start`**: Solution signatures, persistence and adaptation
//! - **`audit`**: Independent post-solve verification and statistics
//! - **`source`**: Input collaborator trait
//!
//! # Pipeline
//!
//! ```text
//! ProblemSource → ScheduleRequest → Optimizer (+ WarmStartHint) → Solution → Auditor
//!                                                                    ↓
//!                                                             WarmStartStore
//! ```
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use u_league::audit::Auditor;
//! use u_league::config::SchedulerConfig;
//! use u_league::models::{round_robin, Slot, Team, Venue};
//! use u_league::scheduler::GreedyOptimizer;
//!
//! let teams: Vec<_> = ["Lions", "Tigers", "Bears", "Wolves"]
//!     .iter()
//!     .map(|n| Arc::new(Team::new(*n, "M").with_pool("A").with_institution(*n)))
//!     .collect();
//! let matches = round_robin("A", &teams, false);
//! let venues = vec![Venue::new("Main Gym").with_capacity(2).with_time("18:00")];
//! let slots = Slot::enumerate(&venues, 1..=4);
//!
//! let config = SchedulerConfig::default().with_seed(1);
//! let solution = GreedyOptimizer::new(config.clone())
//!     .solve(&matches, &slots, &venues, &[])
//!     .unwrap();
//! let report = Auditor::new(config, &venues, &[]).audit(&solution);
//! assert!(report.is_valid());
//! ```

pub mod audit;
pub mod config;
pub mod constraints;
pub mod error;
pub mod models;
pub mod penalty;
pub mod scheduler;
pub mod source;
pub mod state;
pub mod warm_start;
