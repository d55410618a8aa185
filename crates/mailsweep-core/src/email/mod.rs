//! Email domain model and wire-to-domain hydration.

pub mod hydrate;
mod model;

pub use model::{
    Attachment, Category, CleanupCategory, CleanupStats, CleanupStatsSet, Email, PartitionKey,
};
