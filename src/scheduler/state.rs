//! Per-target state derived from the stream of verdicts.

use std::time::Duration;

use chrono::{DateTime, Local};

use crate::probe::Verdict;

/// Tracks consecutive results and the time of the last state change.
#[derive(Debug, Clone)]
pub struct StateTracker {
    last_okay: bool,
    last_change: DateTime<Local>,
    consecutive: u32,
}

impl StateTracker {
    /// Start tracking, assuming the target was online as of `started`.
    pub fn new(started: DateTime<Local>) -> Self {
        Self {
            last_okay: true,
            last_change: started,
            consecutive: 0,
        }
    }

    /// Stamp `consecutive` and `since_change` onto a fresh verdict.
    pub fn observe(&mut self, verdict: &mut Verdict, now: DateTime<Local>) {
        if verdict.okay != self.last_okay {
            self.last_okay = verdict.okay;
            self.last_change = verdict.done;
            self.consecutive = 1;
        } else {
            self.consecutive = self.consecutive.saturating_add(1);
        }

        verdict.consecutive = self.consecutive;
        verdict.since_change = (now - self.last_change).to_std().unwrap_or(Duration::ZERO);
    }
}
