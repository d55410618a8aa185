//! View-state publication.
//!
//! The engine publishes what the active mailbox view should display over a
//! watch channel. Publication is gated on the active partition so that
//! prefetches and late background syncs never touch what the user is
//! looking at.

use std::sync::Mutex;

use tokio::sync::watch;

use crate::email::{Email, PartitionKey};

/// What a mailbox view should display.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// No data yet; a fetch is underway.
    Loading,
    /// A snapshot to display.
    Ready(Vec<Email>),
    /// The fetch failed and there is nothing cached to fall back on.
    Failed(String),
}

/// One published update: which partition, and what to show for it.
#[derive(Debug, Clone)]
pub struct ViewUpdate {
    /// The partition this update belongs to.
    pub partition: PartitionKey,
    /// What to display.
    pub state: ViewState,
}

/// Publisher side of the view channel, tracking the active partition.
#[derive(Debug)]
pub(crate) struct ViewPublisher {
    tx: watch::Sender<ViewUpdate>,
    active: Mutex<PartitionKey>,
}

impl ViewPublisher {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(ViewUpdate {
            partition: PartitionKey::Inbox,
            state: ViewState::Loading,
        });
        Self {
            tx,
            active: Mutex::new(PartitionKey::Inbox),
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ViewUpdate> {
        self.tx.subscribe()
    }

    /// Marks `key` as the partition the user is looking at.
    pub(crate) fn set_active(&self, key: &PartitionKey) {
        if let Ok(mut active) = self.active.lock() {
            *active = key.clone();
        }
    }

    pub(crate) fn active(&self) -> PartitionKey {
        self.active
            .lock()
            .map_or(PartitionKey::Inbox, |active| active.clone())
    }

    /// Publishes `state` for `key` iff `key` is still the active partition.
    ///
    /// Returns whether the update was published.
    pub(crate) fn publish(&self, key: &PartitionKey, state: ViewState) -> bool {
        if self.active() != *key {
            return false;
        }
        self.tx.send_replace(ViewUpdate {
            partition: key.clone(),
            state,
        });
        true
    }
}
