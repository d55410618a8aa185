//! Periodic background sync.
//!
//! Re-enters the same full-sync entrypoint foreground navigation uses, as a
//! background refresh of the root inbox. This is also the only retry
//! mechanism for failed syncs. Nothing stops a tick from overlapping a
//! foreground fetch of the same partition; background fetches never touch
//! a view they are not active for, so the overlap is benign for every
//! partition except the one on screen.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::email::PartitionKey;
use crate::sync::SyncCoordinator;

/// Default sync interval when the host does not configure one.
pub const DEFAULT_SYNC_INTERVAL_HOURS: u64 = 12;

/// Registers and cancels the periodic sync job.
#[derive(Debug, Default)]
pub struct SyncScheduler {
    job: Mutex<Option<JoinHandle<()>>>,
}

impl SyncScheduler {
    /// Creates a scheduler with no job registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the periodic sync, replacing any existing registration.
    ///
    /// The first sync runs one full interval after registration.
    pub async fn schedule(&self, coordinator: SyncCoordinator, interval_hours: u64) {
        let mut job = self.job.lock().await;
        if let Some(previous) = job.take() {
            previous.abort();
        }

        info!(interval_hours, "periodic sync scheduled");
        *job = Some(tokio::spawn(async move {
            let period = Duration::from_secs(interval_hours.saturating_mul(3600));
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately; skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                debug!("periodic sync tick");
                coordinator.request_view(PartitionKey::Inbox, true).await;
            }
        }));
    }

    /// Deregisters the periodic sync, if any.
    pub async fn cancel(&self) {
        if let Some(job) = self.job.lock().await.take() {
            job.abort();
            info!("periodic sync cancelled");
        }
    }
}
