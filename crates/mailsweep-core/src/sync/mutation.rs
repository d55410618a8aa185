//! Optimistic bulk mutation.
//!
//! Deletions hit the active view first and the server second. The view
//! never waits for, and is never rolled back by, the remote outcome; the
//! next successful fetch is the reconciliation point.

use tracing::{debug, warn};

use crate::cleanup::CleanupStatsAggregator;
use crate::sync::coordinator::SyncCoordinator;
use crate::sync::view::ViewState;

/// Label added to trash a message in bulk.
const TRASH_LABEL: &str = "TRASH";

/// Messages per batched modify call.
const DELETE_BATCH_SIZE: usize = 50;

/// Runs optimistic deletes against the active view.
#[derive(Clone)]
pub struct MutationPipeline {
    coordinator: SyncCoordinator,
    aggregator: CleanupStatsAggregator,
}

impl MutationPipeline {
    /// Creates a pipeline bound to the coordinator's active view.
    #[must_use]
    pub const fn new(coordinator: SyncCoordinator, aggregator: CleanupStatsAggregator) -> Self {
        Self {
            coordinator,
            aggregator,
        }
    }

    /// Trashes the given messages.
    ///
    /// The ids disappear from the active view immediately. Remote trashing
    /// runs in fixed-size batches; a failed batch is logged and skipped,
    /// it neither restores the removed ids nor blocks later batches.
    /// Cleanup counters are recomputed afterwards regardless of outcome.
    pub async fn delete_emails(&self, ids: &[String]) {
        if ids.is_empty() {
            return;
        }

        self.remove_from_active_view(ids).await;

        let trash = vec![TRASH_LABEL.to_string()];
        for batch in ids.chunks(DELETE_BATCH_SIZE) {
            match self
                .coordinator
                .source
                .batch_add_labels(batch, &trash)
                .await
            {
                Ok(()) => debug!(count = batch.len(), "trash batch applied"),
                Err(err) => {
                    warn!(count = batch.len(), %err, "trash batch failed, skipping");
                }
            }
        }

        self.recompute_cleanup_counts().await;
    }

    /// Trashes a single message through the dedicated endpoint.
    ///
    /// Same optimistic semantics as [`delete_emails`].
    ///
    /// [`delete_emails`]: MutationPipeline::delete_emails
    pub async fn trash_message(&self, id: &str) {
        let ids = [id.to_string()];
        self.remove_from_active_view(&ids).await;

        if let Err(err) = self.coordinator.source.trash_message(id).await {
            warn!(message_id = %id, %err, "trash failed, view not restored");
        }

        self.recompute_cleanup_counts().await;
    }

    async fn remove_from_active_view(&self, ids: &[String]) {
        let active = self.coordinator.publisher.active();
        let Some(remaining) = self.coordinator.memory.remove_ids(&active, ids).await else {
            return;
        };

        if let Err(err) = self
            .coordinator
            .store
            .save_emails(&active, &remaining)
            .await
        {
            warn!(partition = %active, %err, "failed to persist snapshot after delete");
        }
        self.coordinator
            .publisher
            .publish(&active, ViewState::Ready(remaining));
    }

    async fn recompute_cleanup_counts(&self) {
        match self.aggregator.compute_all().await {
            Ok(stats) => {
                if let Err(err) = self.coordinator.store.save_cleanup_counts(&stats).await {
                    warn!(%err, "failed to persist cleanup counters");
                }
            }
            Err(err) => warn!(%err, "cleanup recomputation failed"),
        }
    }
}
