//! Error types.
//!
//! Constraint evaluation never fails: a rejected assignment is data
//! ([`ConstraintOutcome`](crate::constraints::ConstraintOutcome)). Only
//! resource-level failures and "the optimizer produced nothing" surface
//! as errors.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by an optimizer invocation.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Zero matches were scheduled although modifiable matches existed.
    #[error("no solution found: none of {modifiable} modifiable matches could be placed")]
    NoSolutionFound { modifiable: usize },

    /// The run was cancelled before any attempt completed.
    #[error("optimization cancelled before any attempt completed")]
    Cancelled,

    /// The configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    /// An exact solver backend failed.
    #[error("solver backend failed: {0}")]
    Backend(String),
}

/// Configuration validation and loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("attempts must be at least 1")]
    ZeroAttempts,

    #[error("time preference divisor must be positive, got {0}")]
    NonPositiveDivisor(f64),

    #[error("min_week must be at least 1")]
    ZeroMinWeek,

    #[error("max_matches_per_week must be at least 1")]
    ZeroWeeklyCap,

    #[error("negative or undefined value in {field}: {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("failed to read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Warm-start persistence errors.
///
/// Always recovered by the caller of
/// [`WarmStartStore::try_load_latest`](crate::warm_start::WarmStartStore::try_load_latest);
/// they never fail an optimization run.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed record {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported warm-start schema version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("no stored solution for profile '{profile}'")]
    MissingLatest { profile: String },
}

/// Failure reported by an external input collaborator.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to load {what}: {message}")]
    Load { what: &'static str, message: String },
}
