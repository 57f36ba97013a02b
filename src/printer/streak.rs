//! Outage statistics per target.

use std::time::Duration;

use crate::probe::Verdict;

/// Tracks the worst outage seen for a target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Streak {
    pub longest_outage: Duration,
    pub longest_failure_streak: u32,
}

impl Streak {
    /// Fold a verdict into the running maxima. Passing verdicts leave them as is.
    pub fn record(&mut self, verdict: &Verdict) {
        if verdict.okay {
            return;
        }
        self.longest_failure_streak = self.longest_failure_streak.max(verdict.consecutive);
        self.longest_outage = self.longest_outage.max(verdict.since_change);
    }

    pub fn had_outage(&self) -> bool {
        self.longest_failure_streak > 0
    }
}
