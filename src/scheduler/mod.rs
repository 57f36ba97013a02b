//! Scheduler module for watching targets.
//!
//! Every target gets its own loop; verdicts from all loops are sent to a
//! single channel.

mod state;

pub use state::*;

use crate::config::Timing;
use crate::probe::Verdict;
use crate::target::Target;

use chrono::Local;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Capacity of the verdict channel shared by all targets.
pub const VERDICT_BUFFER: usize = 1000;

/// Runs one watch loop per target.
pub struct Scheduler {
    timing: Timing,
    stop_tx: broadcast::Sender<()>,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(timing: Timing) -> Self {
        let (stop_tx, _) = broadcast::channel(1);
        Self {
            timing,
            stop_tx,
            handles: Vec::new(),
        }
    }

    /// Start watching the given targets. Verdicts are pushed to `tx`.
    ///
    /// The channel closes once every loop has stopped.
    pub fn start(&mut self, targets: Vec<Target>, tx: mpsc::Sender<Verdict>) {
        tracing::info!(
            "Watching {} targets every {:?} (timeout {:?})",
            targets.len(),
            self.timing.interval,
            self.timing.timeout
        );

        for target in targets {
            tracing::info!("Scheduler: Adding target {}", target.title());

            let stop_rx = self.stop_tx.subscribe();
            let handle = tokio::spawn(run_watch_loop(
                Arc::new(target),
                self.timing,
                tx.clone(),
                stop_rx,
            ));
            self.handles.push(handle);
        }
    }

    /// Ask every loop to stop.
    ///
    /// Loops only see the signal between checks: a check already running
    /// finishes and is still emitted, so stopping can take up to one timeout.
    pub fn stop(&self) {
        tracing::info!("Scheduler: Stopping {} targets", self.handles.len());
        let _ = self.stop_tx.send(());
    }

    /// Wait for all loops to exit.
    pub async fn join(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                tracing::error!("Watch loop failed: {}", e);
            }
        }
    }
}

/// Run the watch loop for a single target.
async fn run_watch_loop(
    target: Arc<Target>,
    timing: Timing,
    tx: mpsc::Sender<Verdict>,
    mut stop_rx: broadcast::Receiver<()>,
) {
    let mut tracker = StateTracker::new(Local::now());
    let mut last = Instant::now();

    loop {
        let wait = timing.interval.saturating_sub(last.elapsed());

        tokio::select! {
            biased;
            _ = stop_rx.recv() => {
                break;
            }
            _ = tokio::time::sleep(wait) => {
                last = Instant::now();
                let mut verdict = target.check.execute(timing.timeout).await;

                tracker.observe(&mut verdict, Local::now());
                verdict.target = Some(target.clone());

                if tx.send(verdict).await.is_err() {
                    tracing::warn!("Result channel closed, stopping {}", target.title());
                    break;
                }
            }
        }
    }

    tracing::debug!("Stopped watching {}", target.id());
}
