//! weather-proxy - Resilient Weather Caching Proxy
//!
//! This is the composition root that wires together all the components.

use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;
use weather_proxy::adapters::inbound::{ApiServer, ApiState};
use weather_proxy::adapters::outbound::{AtomicMetricsStore, OpenMeteoClient, RedisCacheStore};
use weather_proxy::application::{CacheWarmer, WeatherService};
use weather_proxy::config::load_config;
use weather_proxy::domain::ports::{CacheStore, Geocoder, MetricsStore, WeatherProvider};
use weather_proxy::infrastructure::rate_limiter::RateLimitConfig;
use weather_proxy::infrastructure::{
    shutdown_signal, CircuitBreaker, CircuitBreakerConfig, RateLimiter, ShutdownController,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting weather-proxy listen={} cache_ttl={}s",
        cfg.listen_addr,
        cfg.cache_ttl_secs
    );

    // ===== COMPOSITION ROOT =====
    // Wire up all adapters and services

    // 1. Outbound adapters. An unreachable cache backend aborts startup.
    let cache: Arc<dyn CacheStore> = Arc::new(RedisCacheStore::connect(&cfg).await?);

    let open_meteo = Arc::new(OpenMeteoClient::new(&cfg)?);
    let geocoder: Arc<dyn Geocoder> = open_meteo.clone();
    let provider: Arc<dyn WeatherProvider> = open_meteo;

    let metrics: Arc<dyn MetricsStore> = Arc::new(AtomicMetricsStore::new());

    // 2. Infrastructure
    let breaker = Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
        failure_threshold: cfg.breaker_fail_max,
        reset_timeout: Duration::from_secs(cfg.breaker_reset_secs),
    }));

    let limiter = Arc::new(RateLimiter::new(RateLimitConfig {
        max_requests: cfg.rate_limit_max_requests,
        window: Duration::from_secs(cfg.rate_limit_window_secs),
    }));
    RateLimiter::start_cleanup(
        limiter.clone(),
        Duration::from_secs(60),
        Duration::from_secs(600),
    );

    // 3. Application services
    let service = Arc::new(WeatherService::new(
        cache.clone(),
        geocoder,
        provider,
        breaker,
        metrics.clone(),
    ));

    let warmer = CacheWarmer::new(
        service.clone(),
        cache.clone(),
        metrics.clone(),
        cfg.warming_enabled,
        cfg.popular_cities.clone(),
    );

    // 4. Shutdown wiring
    let shutdown = ShutdownController::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    // 5. Background cache warming, delayed a moment so the server is
    // already accepting requests when it starts. Warming failure never
    // fails startup.
    let warm_shutdown = shutdown.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = warm_shutdown.wait() => {
                tracing::info!("cache warming cancelled by shutdown");
            }
            _ = async {
                tokio::time::sleep(Duration::from_secs(2)).await;
                let report = warmer.warm(None).await;
                tracing::info!(
                    success = report.success,
                    failed = report.failed,
                    "startup cache warming finished"
                );
            } => {}
        }
    });

    // 6. Inbound adapter: serve until shutdown
    let server = ApiServer::new(
        ApiState {
            service,
            cache,
            metrics,
            limiter,
        },
        cfg.listen_addr.clone(),
    );

    server.run(shutdown).await?;

    tracing::info!("weather-proxy stopped");
    Ok(())
}
