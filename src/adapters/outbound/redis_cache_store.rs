//! Redis Cache Store
//!
//! Implements CacheStore against a Redis backend using a connection
//! manager that transparently re-establishes dropped connections.

use crate::config::Config;
use crate::domain::entities::StoredWeather;
use crate::domain::ports::CacheStore;
use anyhow::Context;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

/// Redis-backed cache store.
///
/// Every operation issues exactly one backend call and degrades on
/// failure: reads become misses, writes become no-ops. Expiry is enforced
/// server-side via SETEX-style TTL writes, so expired entries are evicted
/// by Redis itself and a stale read cannot observe them.
pub struct RedisCacheStore {
    conn: ConnectionManager,
    ttl_secs: u64,
}

impl RedisCacheStore {
    /// Connect to Redis and verify the connection with a PING.
    ///
    /// Startup must abort when the backend is unreachable, so this is the
    /// one place a cache error propagates.
    pub async fn connect(cfg: &Config) -> anyhow::Result<Self> {
        let client = redis::Client::open(cfg.redis_url())
            .context("invalid redis connection settings")?;

        let conn = ConnectionManager::new(client).await.with_context(|| {
            format!(
                "failed to connect to redis at {}:{}",
                cfg.redis_host, cfg.redis_port
            )
        })?;

        let mut probe = conn.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut probe)
            .await
            .context("redis did not answer PING")?;

        tracing::info!(
            "connected to redis at {}:{} (ttl={}s)",
            cfg.redis_host,
            cfg.redis_port,
            cfg.cache_ttl_secs
        );

        Ok(Self {
            conn,
            ttl_secs: cfg.cache_ttl_secs,
        })
    }

    async fn fetch(&self, key: &str) -> Option<StoredWeather> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = match conn.get(key).await {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(key, error = %e, "cache get failed");
                return None;
            }
        };

        let payload = payload?;
        match serde_json::from_str(&payload) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(key, error = %e, "cache payload malformed");
                None
            }
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Option<StoredWeather> {
        let value = self.fetch(key).await;
        match &value {
            Some(_) => tracing::debug!(key, "cache hit"),
            None => tracing::debug!(key, "cache miss"),
        }
        value
    }

    async fn set(&self, key: &str, value: &StoredWeather) -> bool {
        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::error!(key, error = %e, "cache serialization failed");
                return false;
            }
        };

        let mut conn = self.conn.clone();
        match conn.set_ex::<_, _, ()>(key, payload, self.ttl_secs).await {
            Ok(()) => {
                tracing::debug!(key, ttl = self.ttl_secs, "cache set");
                true
            }
            Err(e) => {
                tracing::error!(key, error = %e, "cache set failed");
                false
            }
        }
    }

    async fn get_stale(&self, key: &str) -> Option<StoredWeather> {
        // Redis evicts on expiry, so the freshest view is all there is.
        self.fetch(key).await
    }

    async fn is_connected(&self) -> bool {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .is_ok()
    }
}
