//! Deadline tracking for polling loops
//!
//! Every bounded wait creates its own [`Deadline`]; retries never share or
//! extend an earlier budget.

use std::time::{Duration, Instant};

/// A point in time after which a wait gives up
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    started: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start a deadline `budget` from now
    pub fn after(budget: Duration) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    /// True once the budget has been used up
    pub fn expired(&self) -> bool {
        self.started.elapsed() >= self.budget
    }

    /// Time left before expiry
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.started.elapsed())
    }

    /// Budget this deadline was created with
    pub fn budget(&self) -> Duration {
        self.budget
    }
}
