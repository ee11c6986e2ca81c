//! InvalidatableCache: computed value keyed by a host field

use std::cell::RefCell;
use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use tracing::debug;

use crate::config::{Capacity, CacheConfig};
use crate::error::{Error, Result};
use crate::fifo::{FifoStore, Lookup};
use crate::host::InvalidationSource;
use crate::stats::CacheStats;

type ComputeFn<H, V, E> = Box<dyn Fn(&H) -> std::result::Result<V, E>>;

/// Single-threaded cache for one computed property of one host instance
///
/// Store it as a field of the host it caches for. Each [`get`](Self::get)
/// reads the host's invalidation field; the computation runs only when that
/// value has no retained entry.
///
/// ```
/// use cachedprop::{invalidation_fields, CacheConfig, InvalidatableCache};
///
/// struct Report {
///     revision: u64,
///     rows: Vec<u64>,
///     total: InvalidatableCache<Report, u64>,
/// }
///
/// invalidation_fields!(Report => u64 { revision });
///
/// let mut report = Report {
///     revision: 0,
///     rows: vec![1, 2, 3],
///     total: InvalidatableCache::infallible(CacheConfig::new("revision"), |r: &Report| {
///         r.rows.iter().sum()
///     })
///     .unwrap(),
/// };
///
/// assert_eq!(*report.total.get(&report).unwrap(), 6);
///
/// report.rows.push(4);
/// assert_eq!(*report.total.get(&report).unwrap(), 6); // revision unchanged
///
/// report.revision += 1;
/// assert_eq!(*report.total.get(&report).unwrap(), 10);
/// ```
pub struct InvalidatableCache<H, V, E = Infallible>
where
    H: InvalidationSource,
{
    /// Construction parameters
    config: CacheConfig,

    /// Produces the value from the host
    compute: ComputeFn<H, V, E>,

    /// Retained entries keyed by invalidation value
    entries: RefCell<FifoStore<H::Key, Rc<V>>>,

    /// Cache statistics
    stats: CacheStats,
}

impl<H, V, E> InvalidatableCache<H, V, E>
where
    H: InvalidationSource,
{
    /// Create a cache for a fallible computation
    ///
    /// Retained keys are found by `==`, so any `PartialEq` key works.
    ///
    /// # Arguments
    /// * `config` - Invalidation field, capacity, logging
    /// * `compute` - Produces the value from the host
    ///
    /// # Returns
    /// * `Result<Self>` - Fails on zero capacity, and on unbounded capacity
    ///   (use [`new_hashed`](Self::new_hashed) for that)
    pub fn new<F>(config: CacheConfig, compute: F) -> Result<Self>
    where
        F: Fn(&H) -> std::result::Result<V, E> + 'static,
    {
        let capacity = bounded_capacity(&config)?;
        Ok(Self::from_parts(config, Box::new(compute), FifoStore::new(capacity)))
    }

    fn from_parts(
        config: CacheConfig,
        compute: ComputeFn<H, V, E>,
        entries: FifoStore<H::Key, Rc<V>>,
    ) -> Self {
        Self {
            config,
            compute,
            entries: RefCell::new(entries),
            stats: CacheStats::new(),
        }
    }

    /// Get the value for the host's current invalidation key
    ///
    /// Returns the retained value on a hit. On a miss runs the computation,
    /// stores its result under the key read before computing, and evicts
    /// the oldest entries beyond capacity. A failed computation stores
    /// nothing and is returned as [`Error::Compute`].
    ///
    /// # Panics
    /// If the computation calls `get` on this same cache.
    pub fn get(&self, host: &H) -> Result<Rc<V>, E> {
        let key = read_key::<H, E>(&self.config, host)?;

        let lookup = self
            .entries
            .borrow_mut()
            .get_or_try_insert_with(key, || {
                note_miss(&self.config, &self.stats);
                (self.compute)(host).map(Rc::new)
            })
            .map_err(|e| {
                note_failure(&self.config, &self.stats);
                Error::Compute(e)
            })?;

        note_lookup(&self.config, &self.stats, &lookup);
        Ok(lookup.into_value())
    }

    /// Check if a value is retained for `key`
    pub fn contains_key(&self, key: &H::Key) -> bool {
        self.entries.borrow().contains_key(key)
    }

    /// Retained keys, oldest first
    pub fn keys(&self) -> Vec<H::Key> {
        self.entries.borrow().keys().cloned().collect()
    }

    /// Get current number of retained entries
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Check if nothing has been computed yet
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Get the capacity policy
    pub fn capacity(&self) -> Capacity {
        self.entries.borrow().capacity()
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

impl<H, V, E> InvalidatableCache<H, V, E>
where
    H: InvalidationSource,
    H::Key: Hash + Eq,
{
    /// Create a cache for a fallible computation, indexing keys by hash
    ///
    /// Accepts any capacity, including unbounded.
    pub fn new_hashed<F>(config: CacheConfig, compute: F) -> Result<Self>
    where
        F: Fn(&H) -> std::result::Result<V, E> + 'static,
    {
        let capacity = config.capacity()?;
        Ok(Self::from_parts(config, Box::new(compute), FifoStore::hashed(capacity)))
    }
}

impl<H, V> InvalidatableCache<H, V, Infallible>
where
    H: InvalidationSource,
{
    /// Create a cache for a computation that cannot fail
    pub fn infallible<F>(config: CacheConfig, compute: F) -> Result<Self>
    where
        F: Fn(&H) -> V + 'static,
    {
        Self::new(config, move |host: &H| Ok(compute(host)))
    }

    /// Create a hash-indexed cache for a computation that cannot fail
    pub fn infallible_hashed<F>(config: CacheConfig, compute: F) -> Result<Self>
    where
        F: Fn(&H) -> V + 'static,
        H::Key: Hash + Eq,
    {
        Self::new_hashed(config, move |host: &H| Ok(compute(host)))
    }
}

impl<H, V, E> fmt::Debug for InvalidatableCache<H, V, E>
where
    H: InvalidationSource,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("InvalidatableCache");
        out.field("config", &self.config);
        // Entries stay borrowed while a computation runs
        match self.entries.try_borrow() {
            Ok(entries) => out.field("len", &entries.len()),
            Err(_) => out.field("len", &format_args!("<computing>")),
        };
        out.field("stats", &self.stats).finish_non_exhaustive()
    }
}

/// Capacity for a scanning store: unbounded history needs a hash index
pub(crate) fn bounded_capacity(config: &CacheConfig) -> Result<Capacity> {
    match config.capacity()? {
        Capacity::Unbounded => Err(Error::UnsupportedCapacityPolicy { requested: None }),
        capacity => Ok(capacity),
    }
}

pub(crate) fn read_key<H, E>(config: &CacheConfig, host: &H) -> Result<H::Key, E>
where
    H: InvalidationSource,
{
    host.invalidation_key(&config.invalidation_field)
        .ok_or_else(|| Error::MissingInvalidationField {
            field: config.invalidation_field.clone(),
        })
}

pub(crate) fn note_miss(config: &CacheConfig, stats: &CacheStats) {
    stats.record_miss();
    if config.verbose {
        debug!(
            property = config.label(),
            field = %config.invalidation_field,
            "updating cache"
        );
    }
}

pub(crate) fn note_failure(config: &CacheConfig, stats: &CacheStats) {
    stats.record_compute_failure();
    if config.verbose {
        debug!(property = config.label(), "compute failed, nothing cached");
    }
}

pub(crate) fn note_lookup<V>(config: &CacheConfig, stats: &CacheStats, lookup: &Lookup<V>) {
    match lookup {
        Lookup::Hit(_) => {
            stats.record_hit();
            if config.verbose {
                debug!(property = config.label(), "using cache");
            }
        }
        Lookup::Miss { evicted, .. } => {
            stats.record_insert();
            stats.record_evictions(*evicted);
            if config.verbose && *evicted > 0 {
                debug!(property = config.label(), evicted, "evicted stale entries");
            }
        }
    }
}
