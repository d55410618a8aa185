//! Two-level email cache.
//!
//! Memory is authoritative while the process lives; the durable store is a
//! fallback seeded at cold start. Both hold whole-partition snapshots that
//! are replaced wholesale, never merged.

mod memory;
mod store;

pub use memory::PartitionedCache;
pub use store::CacheStore;
