//! Per-property lookup counters
//!
//! Every `get` is exactly one hit or one miss. A miss runs the computation,
//! which either ends in an insert or a compute failure, so
//! `misses == inserts + compute_failures` always holds.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lookup outcomes for one cached property
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
    inserts: AtomicU64,
    compute_failures: AtomicU64,
}

impl CacheStats {
    /// Counters all at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidation key already had a retained value
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Invalidation key had no retained value; the computation is about to run
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Older invalidation keys dropped to stay within capacity
    pub fn record_evictions(&self, count: usize) {
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// A computed value was stored
    pub fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    /// The computation returned an error; nothing was stored
    pub fn record_compute_failure(&self) {
        self.compute_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Lookups served without computing
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Lookups that ran the computation
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Keys dropped by FIFO eviction
    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    /// Values stored after a successful computation
    pub fn inserts(&self) -> u64 {
        self.inserts.load(Ordering::Relaxed)
    }

    /// Computations that failed
    pub fn compute_failures(&self) -> u64 {
        self.compute_failures.load(Ordering::Relaxed)
    }

    /// Share of lookups that skipped the computation (0.0 before any lookup)
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits() + self.misses();
        if lookups == 0 {
            return 0.0;
        }
        self.hits() as f64 / lookups as f64
    }
}
