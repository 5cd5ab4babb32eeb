//! Periodic sync driver
//!
//! Runs a [`Reconciler`] pass on a fixed interval until cancelled. The first
//! pass starts immediately. A pass that overruns the interval delays the next
//! tick instead of queueing a burst of passes.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use notemirror_core::domain::outcome::SyncOutcome;

use crate::engine::Reconciler;

/// Drives a reconciler on a fixed poll interval
pub struct PeriodicSync {
    reconciler: Arc<Reconciler>,
    interval: Duration,
}

impl PeriodicSync {
    pub fn new(reconciler: Arc<Reconciler>, interval: Duration) -> Self {
        Self {
            reconciler,
            interval,
        }
    }

    /// Loops until `shutdown` is cancelled, returning the number of passes run
    ///
    /// Failed passes are logged and do not stop the loop; the next tick
    /// retries from scratch. A pass already in flight when shutdown arrives
    /// is allowed to finish.
    pub async fn run(&self, shutdown: CancellationToken) -> u64 {
        info!(poll_interval_secs = self.interval.as_secs(), "Starting sync loop");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut passes = 0u64;

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!(passes, "Sync loop stopped");
                    break;
                }
                _ = interval.tick() => {}
            }

            passes += 1;
            match self.reconciler.sync().await {
                SyncOutcome::Success(_) => {}
                SyncOutcome::Busy => info!("Skipping tick, a sync is already running"),
                SyncOutcome::Failed(failure) => {
                    warn!(stage = %failure.stage(), "Sync pass failed, retrying next tick")
                }
            }
        }

        passes
    }
}
