//! Wall-clock budget for one search

use std::time::{Duration, Instant};

/// Absolute deadline with a reserved safety margin
///
/// Searches stop once the margin is breached, leaving the margin for
/// returning the move to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    at: Instant,
    margin: Duration,
}

impl Deadline {
    /// Creates a deadline at `at`, reserving `margin` before it
    pub fn new(at: Instant, margin: Duration) -> Self {
        Deadline { at, margin }
    }

    /// A deadline `budget` from now, reserving `margin`
    pub fn after(budget: Duration, margin: Duration) -> Self {
        Deadline::new(Instant::now() + budget, margin)
    }

    /// The same instant with a different safety margin
    pub fn with_margin(self, margin: Duration) -> Self {
        Deadline { margin, ..self }
    }

    /// The absolute instant the move is due
    pub fn at(&self) -> Instant {
        self.at
    }

    /// The reserved safety margin
    pub fn margin(&self) -> Duration {
        self.margin
    }

    /// The instant searching has to stop
    pub fn stop_at(&self) -> Instant {
        self.at.checked_sub(self.margin).unwrap_or(self.at)
    }

    /// Returns true once no further work should start
    #[inline]
    pub fn expired(&self) -> bool {
        Instant::now() >= self.stop_at()
    }

    /// Time left before searching has to stop
    pub fn remaining(&self) -> Duration {
        self.stop_at().saturating_duration_since(Instant::now())
    }
}
