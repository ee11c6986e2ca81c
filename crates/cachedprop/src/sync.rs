//! SyncInvalidatableCache: mutex-guarded cache for hosts shared across threads

use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use parking_lot::Mutex;

use crate::cache::{bounded_capacity, note_failure, note_lookup, note_miss, read_key};
use crate::config::{Capacity, CacheConfig};
use crate::error::{Error, Result};
use crate::fifo::FifoStore;
use crate::host::InvalidationSource;
use crate::stats::CacheStats;

type ComputeFn<H, V, E> = Box<dyn Fn(&H) -> std::result::Result<V, E> + Send + Sync>;

/// Thread-safe counterpart of [`InvalidatableCache`](crate::InvalidatableCache)
///
/// The lock is held across the whole lookup, including the computation, so
/// concurrent callers never compute the same key twice. Values are shared
/// as `Arc<V>`.
pub struct SyncInvalidatableCache<H, V, E = Infallible>
where
    H: InvalidationSource,
{
    config: CacheConfig,
    compute: ComputeFn<H, V, E>,
    entries: Mutex<FifoStore<H::Key, Arc<V>>>,
    stats: CacheStats,
}

impl<H, V, E> SyncInvalidatableCache<H, V, E>
where
    H: InvalidationSource,
{
    /// Create a cache for a fallible computation
    ///
    /// Bounded capacities only; see [`new_hashed`](Self::new_hashed).
    pub fn new<F>(config: CacheConfig, compute: F) -> Result<Self>
    where
        F: Fn(&H) -> std::result::Result<V, E> + Send + Sync + 'static,
    {
        let capacity = bounded_capacity(&config)?;
        Ok(Self::from_parts(config, Box::new(compute), FifoStore::new(capacity)))
    }

    fn from_parts(
        config: CacheConfig,
        compute: ComputeFn<H, V, E>,
        entries: FifoStore<H::Key, Arc<V>>,
    ) -> Self {
        Self {
            config,
            compute,
            entries: Mutex::new(entries),
            stats: CacheStats::new(),
        }
    }

    /// Get the value for the host's current invalidation key
    ///
    /// Same contract as [`InvalidatableCache::get`](crate::InvalidatableCache::get).
    /// A computation that calls `get` on this same cache deadlocks.
    pub fn get(&self, host: &H) -> Result<Arc<V>, E> {
        let key = read_key::<H, E>(&self.config, host)?;

        let mut entries = self.entries.lock();
        let lookup = entries
            .get_or_try_insert_with(key, || {
                note_miss(&self.config, &self.stats);
                (self.compute)(host).map(Arc::new)
            })
            .map_err(|e| {
                note_failure(&self.config, &self.stats);
                Error::Compute(e)
            })?;
        drop(entries);

        note_lookup(&self.config, &self.stats, &lookup);
        Ok(lookup.into_value())
    }

    /// Check if a value is retained for `key`
    pub fn contains_key(&self, key: &H::Key) -> bool {
        self.entries.lock().contains_key(key)
    }

    /// Retained keys, oldest first
    pub fn keys(&self) -> Vec<H::Key> {
        self.entries.lock().keys().cloned().collect()
    }

    /// Get current number of retained entries
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if nothing has been computed yet
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Get the capacity policy
    pub fn capacity(&self) -> Capacity {
        self.entries.lock().capacity()
    }

    /// Get the construction parameters
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }
}

impl<H, V, E> SyncInvalidatableCache<H, V, E>
where
    H: InvalidationSource,
    H::Key: Hash + Eq,
{
    /// Create a hash-indexed cache for a fallible computation; any capacity
    pub fn new_hashed<F>(config: CacheConfig, compute: F) -> Result<Self>
    where
        F: Fn(&H) -> std::result::Result<V, E> + Send + Sync + 'static,
    {
        let capacity = config.capacity()?;
        Ok(Self::from_parts(config, Box::new(compute), FifoStore::hashed(capacity)))
    }
}

impl<H, V> SyncInvalidatableCache<H, V, Infallible>
where
    H: InvalidationSource,
{
    /// Create a cache for a computation that cannot fail
    pub fn infallible<F>(config: CacheConfig, compute: F) -> Result<Self>
    where
        F: Fn(&H) -> V + Send + Sync + 'static,
    {
        Self::new(config, move |host: &H| Ok(compute(host)))
    }

    /// Create a hash-indexed cache for a computation that cannot fail
    pub fn infallible_hashed<F>(config: CacheConfig, compute: F) -> Result<Self>
    where
        F: Fn(&H) -> V + Send + Sync + 'static,
        H::Key: Hash + Eq,
    {
        Self::new_hashed(config, move |host: &H| Ok(compute(host)))
    }
}

impl<H, V, E> fmt::Debug for SyncInvalidatableCache<H, V, E>
where
    H: InvalidationSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("SyncInvalidatableCache");
        out.field("config", &self.config);
        // The lock is held for the whole computation
        match self.entries.try_lock() {
            Some(entries) => out.field("len", &entries.len()),
            None => out.field("len", &format_args!("<computing>")),
        };
        out.field("stats", &self.stats).finish_non_exhaustive()
    }
}
