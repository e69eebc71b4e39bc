//! Weather Lookup Service - Main application use case
//!
//! Orchestrates the lookup path: cache consultation, geocoding, the
//! breaker-guarded weather fetch, and cache population. This is the
//! primary interface for the inbound adapter and the cache warmer.

use crate::domain::entities::{cache_key, StoredWeather, WeatherRecord};
use crate::domain::errors::LookupError;
use crate::domain::ports::{CacheStore, Geocoder, MetricsStore, WeatherProvider};
use crate::infrastructure::circuit_breaker::{BreakerError, CircuitBreaker};
use std::sync::Arc;

/// Weather lookup service.
///
/// A lookup runs through:
/// 1. Input validation (empty city names are the caller's fault)
/// 2. Cache consultation by normalized key
/// 3. On miss, geocoding (unguarded) then the weather fetch through the
///    circuit breaker
/// 4. Best-effort cache population of the fresh result
///
/// Callers only ever see a `LookupError`; cache trouble degrades to
/// miss/no-op behavior and upstream trouble is normalized into the
/// unavailable class.
pub struct WeatherService {
    cache: Arc<dyn CacheStore>,
    geocoder: Arc<dyn Geocoder>,
    provider: Arc<dyn WeatherProvider>,
    breaker: Arc<CircuitBreaker>,
    metrics: Arc<dyn MetricsStore>,
}

impl WeatherService {
    /// Create a new weather service.
    pub fn new(
        cache: Arc<dyn CacheStore>,
        geocoder: Arc<dyn Geocoder>,
        provider: Arc<dyn WeatherProvider>,
        breaker: Arc<CircuitBreaker>,
        metrics: Arc<dyn MetricsStore>,
    ) -> Self {
        Self {
            cache,
            geocoder,
            provider,
            breaker,
            metrics,
        }
    }

    /// Get current weather for a city, from the cache when possible.
    pub async fn get_weather(&self, city: &str) -> Result<WeatherRecord, LookupError> {
        if city.trim().is_empty() {
            return Err(LookupError::InvalidCity);
        }

        let key = cache_key(city);
        if let Some(stored) = self.cache.get(&key).await {
            self.metrics.record_cache_hit();
            self.metrics.record_lookup(true);
            tracing::info!(city, "weather served from cache");
            return Ok(stored.into_record(true));
        }
        self.metrics.record_cache_miss();

        let result = self.fetch_and_cache(city, &key).await;
        self.metrics.record_lookup(result.is_ok());
        result
    }

    async fn fetch_and_cache(&self, city: &str, key: &str) -> Result<WeatherRecord, LookupError> {
        let candidates = self.geocoder.geocode(city).await.map_err(|e| {
            tracing::error!(city, error = %e, "geocoding failed");
            LookupError::Unavailable(format!("geocoding failed: {e}"))
        })?;

        // Only the first candidate matters; none means the city does not
        // exist upstream, which is a client error rather than an outage.
        let location = match candidates.first() {
            Some(candidate) => *candidate,
            None => return Err(LookupError::CityNotFound(city.to_string())),
        };
        tracing::info!(
            city,
            latitude = location.latitude,
            longitude = location.longitude,
            "geocoding success"
        );

        let conditions = self
            .breaker
            .run(|| self.provider.fetch_current(location))
            .await
            .map_err(|e| match e {
                BreakerError::Open => {
                    tracing::error!(city, "circuit breaker open, rejecting lookup");
                    LookupError::Unavailable(
                        "service temporarily unavailable (circuit breaker open)".to_string(),
                    )
                }
                BreakerError::Inner(e) => {
                    tracing::error!(city, error = %e, "weather fetch failed");
                    LookupError::Unavailable(format!("weather fetch failed: {e}"))
                }
            })?;

        let record = WeatherRecord {
            city: city.to_string(),
            temperature: conditions.temperature,
            wind_speed: conditions.wind_speed,
            weather_code: conditions.weather_code,
            cached: false,
        };

        // Best-effort: a failed write degrades to "not cached", the caller
        // still gets the fresh result.
        if !self.cache.set(key, &StoredWeather::from(&record)).await {
            tracing::warn!(city, "weather result not cached");
        }

        tracing::info!(city, temperature = record.temperature, "weather fetched");
        Ok(record)
    }
}
