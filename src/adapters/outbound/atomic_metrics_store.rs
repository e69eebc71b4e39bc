//! Atomic Metrics Store
//!
//! Implements MetricsStore with plain atomic counters.

use crate::domain::ports::{MetricsSnapshot, MetricsStore};
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free counter store for the lookup hot path.
#[derive(Debug, Default)]
pub struct AtomicMetricsStore {
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    lookups: AtomicU64,
    lookup_failures: AtomicU64,
    warmed_success: AtomicU64,
    warmed_failed: AtomicU64,
}

impl AtomicMetricsStore {
    /// Create a new store with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetricsStore for AtomicMetricsStore {
    fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    fn record_lookup(&self, success: bool) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.lookup_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn record_warming(&self, success: usize, failed: usize) {
        self.warmed_success.fetch_add(success as u64, Ordering::Relaxed);
        self.warmed_failed.fetch_add(failed as u64, Ordering::Relaxed);
    }

    fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            lookup_failures: self.lookup_failures.load(Ordering::Relaxed),
            warmed_success: self.warmed_success.load(Ordering::Relaxed),
            warmed_failed: self.warmed_failed.load(Ordering::Relaxed),
        }
    }
}
