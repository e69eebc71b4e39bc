//! weather-proxy Library
//!
//! This module exposes the weather proxy components for use in
//! integration tests and as a library.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::inbound::{ApiServer, ApiState};
pub use adapters::outbound::{AtomicMetricsStore, MemoryCacheStore, OpenMeteoClient, RedisCacheStore};
pub use application::{CacheWarmer, WeatherService};
pub use config::{load_config, Config};
pub use domain::entities::{cache_key, StoredWeather, WarmingReport, WeatherRecord};
pub use domain::errors::{LookupError, UpstreamError};
pub use domain::ports::{CacheStore, Geocoder, MetricsStore, WeatherProvider};
pub use infrastructure::{
    CircuitBreaker, CircuitBreakerConfig, CircuitState, RateLimiter, ShutdownController,
};
