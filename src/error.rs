//! Error types for the knapsack solver.
//!
//! Deadline exhaustion is deliberately absent here: running out of time is a
//! normal way for a search to end and is reported through
//! [`crate::deadline::Termination`] on a successful outcome.

use std::collections::TryReserveError;
use thiserror::Error;

/// Result type alias for solver operations.
pub type KnapsackResult<T> = Result<T, KnapsackError>;

/// Unified error type for loading instances, configuring and running solvers.
#[derive(Debug, Error)]
pub enum KnapsackError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or missing token while reading an instance file.
    #[error("cannot read {what}: {token}")]
    Parse {
        /// Field that was being read.
        what: &'static str,
        /// Offending token, or a description of what was missing.
        token: String,
    },

    /// The instance violates a precondition the engine relies on.
    #[error("invalid instance: {0}")]
    Precondition(String),

    /// A buffer could not be allocated.
    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// Invalid algorithm parameter.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// CSV export error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
