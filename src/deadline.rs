//! Cooperative wall-clock deadline shared by every search loop of a run.
//!
//! A [`Deadline`] is created once at the top of a run and passed by reference
//! into every nested search. Long loops call [`Deadline::check`] at their
//! checkpoints; once the budget is spent the call returns `Err(Expired)` and
//! the caller unwinds with `?`, so every frame on the way out still runs its
//! destructors and gets a chance to restore its best state.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Marker returned by [`Deadline::check`] once the time budget is exhausted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expired;

/// Outcome of a search loop that may stop at a checkpoint.
pub type Checked<T> = Result<T, Expired>;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The algorithm exhausted its own iteration budget or converged.
    Completed,
    /// The run stopped at a checkpoint because the deadline passed.
    DeadlineReached,
}

impl std::fmt::Display for Termination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Termination::Completed => write!(f, "completed"),
            Termination::DeadlineReached => write!(f, "deadline reached"),
        }
    }
}

/// Wall-clock budget measured from the moment the deadline was started.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    /// A deadline that never expires
    pub fn unbounded() -> Self {
        Deadline {
            start: Instant::now(),
            limit: None,
        }
    }

    /// Start a deadline of `limit` from now
    pub fn after(limit: Duration) -> Self {
        Deadline {
            start: Instant::now(),
            limit: Some(limit),
        }
    }

    /// Start a deadline of `seconds` from now; zero (or less) means unbounded,
    /// and so does a budget too large for a `Duration`
    pub fn from_secs(seconds: f64) -> Self {
        if seconds > 0.0 {
            Duration::try_from_secs_f64(seconds)
                .map(Self::after)
                .unwrap_or_else(|_| Self::unbounded())
        } else {
            Self::unbounded()
        }
    }

    /// Time spent since the deadline was started
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// The configured budget, if any
    pub fn limit(&self) -> Option<Duration> {
        self.limit
    }

    /// Whether the budget has been exceeded
    pub fn is_expired(&self) -> bool {
        match self.limit {
            Some(limit) => self.start.elapsed() > limit,
            None => false,
        }
    }

    /// Checkpoint: `Err(Expired)` once the budget has been exceeded
    #[inline]
    pub fn check(&self) -> Checked<()> {
        if self.is_expired() {
            Err(Expired)
        } else {
            Ok(())
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Map the result of a checked search onto how the run ended.
pub fn termination_of<T>(result: &Checked<T>) -> Termination {
    match result {
        Ok(_) => Termination::Completed,
        Err(Expired) => Termination::DeadlineReached,
    }
}
