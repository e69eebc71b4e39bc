//! Rate Limiter
//!
//! Token bucket rate limiting per client IP, applied to the weather
//! endpoint only. The default policy is 100 requests per minute.

use dashmap::DashMap;
use parking_lot::Mutex;
use std::net::IpAddr;
use std::time::{Duration, Instant};

/// Rate limiter configuration.
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u64,
    /// Time window for rate limiting
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
        }
    }
}

/// Per-client token bucket.
#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket rate limiter keyed by client IP.
///
/// Buckets refill continuously at `max_requests / window` and cap at
/// `max_requests`, so a full window of quota can be spent in a burst.
pub struct RateLimiter {
    config: RateLimitConfig,
    clients: DashMap<IpAddr, Mutex<TokenBucket>>,
    refill_per_sec: f64,
}

impl RateLimiter {
    /// Create a new rate limiter.
    pub fn new(config: RateLimitConfig) -> Self {
        let refill_per_sec = config.max_requests as f64 / config.window.as_secs_f64();
        Self {
            config,
            clients: DashMap::new(),
            refill_per_sec,
        }
    }

    /// Check whether a request from this client is allowed, consuming one
    /// token if so.
    pub fn check(&self, ip: IpAddr) -> bool {
        let entry = self.clients.entry(ip).or_insert_with(|| {
            Mutex::new(TokenBucket {
                tokens: self.config.max_requests as f64,
                last_refill: Instant::now(),
            })
        });

        let mut bucket = entry.lock();
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec)
            .min(self.config.max_requests as f64);
        bucket.last_refill = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Seconds until a rejected client has a token again. Used for the
    /// Retry-After response header.
    pub fn retry_after_secs(&self) -> u64 {
        (1.0 / self.refill_per_sec).ceil() as u64
    }

    /// Get the number of tracked clients.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Remove clients that have been idle longer than `max_age`.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.clients
            .retain(|_, bucket| now.duration_since(bucket.lock().last_refill) < max_age);
    }

    /// Start a periodic cleanup task to bound memory on long uptimes.
    pub fn start_cleanup(limiter: std::sync::Arc<Self>, interval: Duration, max_age: Duration) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let before = limiter.client_count();
                limiter.cleanup(max_age);
                let after = limiter.client_count();
                if before != after {
                    tracing::debug!("rate limiter cleanup removed {} idle clients", before - after);
                }
            }
        });
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}
