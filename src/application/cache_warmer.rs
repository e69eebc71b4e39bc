//! Cache Warmer - Startup pre-population of popular cities
//!
//! Issues the same lookups organic traffic would, concurrently, shortly
//! after startup. Warming never blocks readiness and never propagates
//! per-city failures: they are absorbed into a count.

use crate::application::weather_service::WeatherService;
use crate::domain::entities::{cache_key, WarmingReport};
use crate::domain::ports::{CacheStore, MetricsStore};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Cache warmer for the configured popular-city list.
pub struct CacheWarmer {
    service: Arc<WeatherService>,
    cache: Arc<dyn CacheStore>,
    metrics: Arc<dyn MetricsStore>,
    enabled: bool,
    default_cities: Vec<String>,
}

impl CacheWarmer {
    /// Create a new cache warmer.
    pub fn new(
        service: Arc<WeatherService>,
        cache: Arc<dyn CacheStore>,
        metrics: Arc<dyn MetricsStore>,
        enabled: bool,
        default_cities: Vec<String>,
    ) -> Self {
        Self {
            service,
            cache,
            metrics,
            enabled,
            default_cities,
        }
    }

    /// Warm the cache for the given cities, or the configured default
    /// list when none are given.
    ///
    /// All per-city lookups run concurrently as one batch; the report is
    /// produced only once every city has resolved. When warming is
    /// disabled this returns immediately with an empty report and no side
    /// effects.
    pub async fn warm(&self, cities: Option<&[String]>) -> WarmingReport {
        if !self.enabled {
            tracing::info!("cache warming disabled");
            return WarmingReport::default();
        }

        let cities: Vec<String> = cities
            .map(<[String]>::to_vec)
            .unwrap_or_else(|| self.default_cities.clone());

        tracing::info!(count = cities.len(), "cache warming started");

        let mut tasks = JoinSet::new();
        for city in cities {
            let service = self.service.clone();
            let cache = self.cache.clone();
            tasks.spawn(async move { warm_city(&service, cache.as_ref(), &city).await });
        }

        let mut report = WarmingReport::default();
        while let Some(joined) = tasks.join_next().await {
            // A panicked warm task counts as a plain failure
            match joined {
                Ok(true) => report.success += 1,
                Ok(false) | Err(_) => report.failed += 1,
            }
        }

        self.metrics.record_warming(report.success, report.failed);
        tracing::info!(
            success = report.success,
            failed = report.failed,
            "cache warming completed"
        );
        report
    }
}

/// Warm a single city. Returns whether the lookup succeeded.
async fn warm_city(service: &WeatherService, cache: &dyn CacheStore, city: &str) -> bool {
    // Distinguish refreshing a lapsed entry from a cold start, for the log
    // only; serving never takes this path.
    let refresh = cache.get_stale(&cache_key(city)).await.is_some();

    match service.get_weather(city).await {
        Ok(_) => {
            tracing::info!(city, refresh, "cache warming city succeeded");
            true
        }
        Err(e) => {
            tracing::warn!(city, error = %e, "cache warming city failed");
            false
        }
    }
}
