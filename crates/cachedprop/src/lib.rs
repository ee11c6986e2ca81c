//! # cachedprop
//!
//! Computed properties that are cached per host instance and recomputed
//! only when an invalidation key read from the host changes.
//!
//! ## Architecture
//! - **Host binding**: [`InvalidationSource`] reads the key by field name
//! - **Entry store**: insertion-ordered deque, equality scan or AHash index,
//!   FIFO eviction
//! - **Caches**: [`InvalidatableCache`] (single-threaded, `Rc` values) and
//!   [`SyncInvalidatableCache`] (mutex-guarded, `Arc` values)
//! - **Diagnostics**: hit/miss counters, optional `tracing` output
//!
//! ## Policy
//! - Default capacity is one entry: any key change recomputes
//! - Larger capacities evict the oldest-inserted key; hits never reorder
//! - A failed computation stores nothing and is returned to the caller

#![warn(missing_docs)]

mod cache;
mod config;
mod error;
mod fifo;
mod host;
mod stats;
mod sync;

pub use cache::InvalidatableCache;
pub use config::{CacheConfig, Capacity, DEFAULT_MAX_ENTRIES};
pub use error::{Error, Result};
pub use fifo::{FifoStore, Lookup};
pub use host::InvalidationSource;
pub use stats::CacheStats;
pub use sync::SyncInvalidatableCache;
