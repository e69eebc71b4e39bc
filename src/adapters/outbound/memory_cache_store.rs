//! In-Memory Cache Store
//!
//! Implements CacheStore with a DashMap for tests and local tooling.

use crate::domain::entities::StoredWeather;
use crate::domain::ports::CacheStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};

struct MemoryEntry {
    value: StoredWeather,
    expires_at: Instant,
}

/// DashMap-backed cache store with the same TTL semantics as the Redis
/// adapter.
///
/// Unlike Redis, expired entries stay in the map until overwritten, which
/// gives `get_stale` something real to return and lets tests observe
/// expiry directly.
pub struct MemoryCacheStore {
    entries: DashMap<String, MemoryEntry>,
    ttl: Duration,
}

impl MemoryCacheStore {
    /// Create a new store with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Number of entries currently held, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Option<StoredWeather> {
        self.entries.get(key).and_then(|entry| {
            if Instant::now() < entry.expires_at {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    async fn set(&self, key: &str, value: &StoredWeather) -> bool {
        self.entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        true
    }

    async fn get_stale(&self, key: &str) -> Option<StoredWeather> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    async fn is_connected(&self) -> bool {
        true
    }
}
