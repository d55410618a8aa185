//! # mailsweep-core
//!
//! Local email cache and synchronization engine.
//!
//! This crate provides:
//! - **Partitioned cache** - independent snapshots per mailbox view
//!   (inbox, label, cleanup category), memory-first with a durable
//!   `SQLite` fallback
//! - **Sync coordination** - stale-while-revalidate fetching with
//!   cancel-on-navigate and best-effort prefetch of secondary partitions
//! - **Optimistic mutation** - bulk trash that updates the view before the
//!   server confirms
//! - **Cleanup statistics** - promotional/heavy/bank-ad counts and sizes
//! - **Categorization** - a layered keyword classifier behind a trait seam
//! - **Scheduling** - periodic background re-sync
//!
//! The remote mailbox is consumed through the
//! [`MailSource`](mailsweep_gmail::MailSource) trait from `mailsweep-gmail`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod classify;
pub mod cleanup;
pub mod email;
mod error;
mod scheduler;
pub mod sync;

pub use cache::{CacheStore, PartitionedCache};
pub use classify::{Categorizer, RuleClassifier};
pub use cleanup::CleanupStatsAggregator;
pub use email::{
    Attachment, Category, CleanupCategory, CleanupStats, CleanupStatsSet, Email, PartitionKey,
};
pub use error::{Error, Result};
pub use scheduler::{DEFAULT_SYNC_INTERVAL_HOURS, SyncScheduler};
pub use sync::{MutationPipeline, SyncCoordinator, ViewState, ViewUpdate};

pub use mailsweep_gmail::{Label, LabelKind};
