//! Cache Store Port
//!
//! Defines the interface for the TTL-bounded weather cache.
//! Implementations may use Redis or in-memory storage.

use crate::domain::entities::StoredWeather;
use async_trait::async_trait;

/// Key/value store with expiry for weather records.
///
/// This is an outbound port that abstracts the cache backend. Every
/// operation degrades instead of failing: a backend error or malformed
/// payload behaves as a miss on read and a no-op on write, so callers
/// decide whether absence means "fetch fresh". One backend call per
/// operation, no internal retries.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a fresh value. Returns `None` on miss, expiry, backend error,
    /// or a payload that no longer deserializes.
    async fn get(&self, key: &str) -> Option<StoredWeather>;

    /// Write a value with the configured TTL. Returns whether the write
    /// took effect; `false` is a soft failure.
    async fn set(&self, key: &str, value: &StoredWeather) -> bool;

    /// Read bypassing freshness. Used by warming analysis, never for
    /// serving. Backends that evict on expiry return the same as `get`.
    async fn get_stale(&self, key: &str) -> Option<StoredWeather>;

    /// Lightweight liveness probe for health/readiness checks.
    async fn is_connected(&self) -> bool;
}
