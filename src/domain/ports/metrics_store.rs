//! Metrics Store Port
//!
//! Defines the interface for recording and reading runtime counters.

use serde::Serialize;

/// Point-in-time view of all counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub lookups: u64,
    pub lookup_failures: u64,
    pub warmed_success: u64,
    pub warmed_failed: u64,
}

/// Store for runtime counters.
///
/// This is an outbound port for tracking cache effectiveness and warming
/// outcomes. Recording must be cheap enough to sit on the lookup hot path.
pub trait MetricsStore: Send + Sync {
    /// Record a lookup served from the cache.
    fn record_cache_hit(&self);

    /// Record a lookup that had to go upstream.
    fn record_cache_miss(&self);

    /// Record a completed lookup attempt.
    fn record_lookup(&self, success: bool);

    /// Record the outcome of a warming run.
    fn record_warming(&self, success: usize, failed: usize);

    /// Read all counters.
    fn snapshot(&self) -> MetricsSnapshot;
}
