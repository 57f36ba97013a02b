//! Probe module for reachability checks.
//!
//! Supports TCP connect and ICMP echo probes, plus a group that runs
//! several probes at once and folds them into one verdict.

mod group;
mod ping;
mod tcp;

pub use group::*;
pub use ping::*;
pub use tcp::*;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use thiserror::Error;

use crate::target::Target;

/// Glyph appended to the hint of a passing check.
pub const OKAY_GLYPH: &str = "✔︎";

/// Glyph appended to the hint of a failing check.
pub const FAIL_GLYPH: &str = "✖︎";

/// Probe error types.
///
/// These never leave a probe: they are logged and turned into a failed
/// verdict.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("command failed: {0}")]
    Command(String),
}

/// Anything that can be checked to be online.
#[async_trait]
pub trait Check: Send + Sync {
    /// Run the check once. Must return within `timeout` plus scheduling slack.
    async fn execute(&self, timeout: Duration) -> Verdict;

    /// Short description for log output.
    fn name(&self) -> String;
}

/// The outcome of a single check execution.
#[derive(Debug, Clone)]
pub struct Verdict {
    /// When the check completed
    pub done: DateTime<Local>,
    /// How long the check took
    pub took: Duration,
    /// True if the check succeeded
    pub okay: bool,
    /// Number of verdicts in a row with the same `okay`, including this one.
    /// Zero until stamped by the scheduler.
    pub consecutive: u32,
    /// Time since `okay` last flipped.
    pub since_change: Duration,
    /// One `"<kind> <glyph>"` entry per probe that contributed.
    pub hints: Vec<String>,
    /// The target this verdict belongs to, set by the scheduler.
    pub target: Option<Arc<Target>>,
}

impl Verdict {
    /// A fresh, unstamped verdict completed right now.
    pub fn new(okay: bool, took: Duration) -> Self {
        Self {
            done: Local::now(),
            took,
            okay,
            consecutive: 0,
            since_change: Duration::ZERO,
            hints: Vec::new(),
            target: None,
        }
    }

    /// Attach a hint for the given check kind, suffixed with the outcome glyph.
    pub fn with_hint(mut self, kind: &str) -> Self {
        let hint = format!("{} {}", kind, self.short_text());
        self.hints.push(hint);
        self
    }

    /// The verdict as a single glyph.
    pub fn short_text(&self) -> &'static str {
        if self.okay {
            OKAY_GLYPH
        } else {
            FAIL_GLYPH
        }
    }
}
