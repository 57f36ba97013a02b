//! Check group: runs several checks concurrently and combines them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinSet;

use super::{Check, Verdict};
use crate::target::ConfigError;

/// Combines multiple checks into one.
pub struct CheckGroup {
    checks: Vec<Arc<dyn Check>>,
}

impl CheckGroup {
    /// Create a group. A group without members is a configuration error.
    pub fn new(checks: Vec<Arc<dyn Check>>) -> Result<Self, ConfigError> {
        if checks.is_empty() {
            return Err(ConfigError::NoChecks);
        }
        Ok(Self { checks })
    }
}

#[async_trait]
impl Check for CheckGroup {
    /// Runs every member on its own task with the full timeout and waits
    /// for all of them, see [`fold_verdicts`] for how results combine.
    async fn execute(&self, timeout: Duration) -> Verdict {
        let mut set = JoinSet::new();
        let mut names = HashMap::with_capacity(self.checks.len());
        for check in &self.checks {
            let name = check.name();
            let check = check.clone();
            let handle = set.spawn(async move { check.execute(timeout).await });
            names.insert(handle.id(), name);
        }

        let mut results = Vec::with_capacity(self.checks.len());
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(verdict) => results.push(verdict),
                Err(e) => {
                    // The member still gets a failing hint of its own.
                    let name = names.remove(&e.id()).unwrap_or_else(|| self.name());
                    tracing::error!("Check task for {} failed: {}", name, e);
                    results.push(Verdict::new(false, Duration::ZERO).with_hint(&name));
                }
            }
        }

        fold_verdicts(results)
    }

    fn name(&self) -> String {
        let names: Vec<String> = self.checks.iter().map(|c| c.name()).collect();
        names.join(" + ")
    }
}

/// Fold member verdicts into one:
///
/// - `done` is the completion time of the last member.
/// - `took` is the longest member time.
/// - `okay` is true if all members passed.
/// - `hints` are concatenated in arrival order.
pub fn fold_verdicts(results: Vec<Verdict>) -> Verdict {
    let mut combined = Verdict::new(true, Duration::ZERO);
    let mut done = None;

    for r in results {
        done = Some(match done {
            Some(d) if d >= r.done => d,
            _ => r.done,
        });
        combined.okay &= r.okay;
        combined.took = combined.took.max(r.took);
        combined.hints.extend(r.hints);
    }

    if let Some(done) = done {
        combined.done = done;
    }
    combined
}
