//! HTTP API Server
//!
//! Exposes the weather lookup, health probes, and counter snapshot over
//! HTTP. Every request carries a correlation ID; the weather endpoint is
//! rate limited per client IP.

use crate::application::WeatherService;
use crate::domain::entities::WeatherRecord;
use crate::domain::errors::LookupError;
use crate::domain::ports::{CacheStore, MetricsSnapshot, MetricsStore};
use crate::infrastructure::{RateLimiter, ShutdownController};
use axum::{
    extract::{ConnectInfo, Query, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

const CORRELATION_HEADER: &str = "x-correlation-id";

/// Weather lookup query parameters.
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    #[serde(default)]
    pub city: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub cache_connected: bool,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

/// Shared state for all handlers.
#[derive(Clone)]
pub struct ApiState {
    pub service: Arc<WeatherService>,
    pub cache: Arc<dyn CacheStore>,
    pub metrics: Arc<dyn MetricsStore>,
    pub limiter: Arc<RateLimiter>,
}

/// HTTP API server.
pub struct ApiServer {
    state: ApiState,
    listen_addr: String,
}

impl ApiServer {
    /// Create a new API server.
    pub fn new(state: ApiState, listen_addr: String) -> Self {
        Self { state, listen_addr }
    }

    /// Bind and serve until shutdown is signalled. In-flight requests are
    /// drained by axum's graceful shutdown.
    pub async fn run(&self, shutdown: ShutdownController) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("API server listening on {}", self.listen_addr);

        axum::serve(
            listener,
            router(self.state.clone()).into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await?;

        Ok(())
    }
}

/// Build the router with all routes and middleware.
pub fn router(state: ApiState) -> Router {
    let weather = Router::new()
        .route("/weather", get(get_weather))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .merge(weather)
        .route("/health", get(health))
        .route("/health/live", get(liveness))
        .route("/health/ready", get(readiness))
        .route("/metrics", get(metrics_snapshot))
        .layer(middleware::from_fn(correlation_id))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /weather?city=…
async fn get_weather(
    State(state): State<ApiState>,
    Query(query): Query<WeatherQuery>,
) -> Result<Json<WeatherRecord>, Response> {
    let city = query.city.unwrap_or_default();

    match state.service.get_weather(&city).await {
        Ok(record) => Ok(Json(record)),
        Err(e) => {
            tracing::error!(city = %city, error = %e, "weather request failed");
            Err(lookup_error_response(&e))
        }
    }
}

/// GET /health - combined health check.
async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let cache_connected = state.cache.is_connected().await;
    tracing::info!(cache_connected, "health check");

    Json(HealthResponse {
        status: if cache_connected { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache_connected,
    })
}

/// GET /health/live - liveness probe, always 200 while the process runs.
async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "alive" }))
}

/// GET /health/ready - readiness probe, 503 until the cache is reachable.
async fn readiness(State(state): State<ApiState>) -> Result<Json<HealthResponse>, Response> {
    let cache_connected = state.cache.is_connected().await;

    if !cache_connected {
        tracing::warn!("readiness check failed: cache not connected");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "not ready".to_string(),
                detail: "cache backend not connected".to_string(),
            }),
        )
            .into_response());
    }

    Ok(Json(HealthResponse {
        status: "ready".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        cache_connected,
    }))
}

/// GET /metrics - counter snapshot.
async fn metrics_snapshot(State(state): State<ApiState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

/// Map a lookup error to its HTTP response.
fn lookup_error_response(err: &LookupError) -> Response {
    let status = if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let error = match status {
        StatusCode::BAD_REQUEST => "invalid request",
        _ => "service unavailable",
    };

    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
            detail: err.to_string(),
        }),
    )
        .into_response()
}

/// Reject clients over their per-IP request budget with 429.
async fn rate_limit(
    State(state): State<ApiState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Response {
    if state.limiter.check(addr.ip()) {
        return next.run(request).await;
    }

    tracing::warn!(client = %addr.ip(), "rate limit exceeded");
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorResponse {
            error: "rate limit exceeded".to_string(),
            detail: "too many requests".to_string(),
        }),
    )
        .into_response();

    if let Ok(value) = HeaderValue::from_str(&state.limiter.retry_after_secs().to_string()) {
        response.headers_mut().insert("retry-after", value);
    }
    response
}

/// Echo or mint a correlation ID and bind it to the request span.
async fn correlation_id(request: Request, next: Next) -> Response {
    let id = request
        .headers()
        .get(CORRELATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!("request", correlation_id = %id);
    let mut response = next.run(request).instrument(span).await;

    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(CORRELATION_HEADER, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::{AtomicMetricsStore, MemoryCacheStore};
    use crate::domain::entities::{CurrentConditions, GeoCandidate, StoredWeather};
    use crate::domain::errors::UpstreamError;
    use crate::domain::ports::{Geocoder, WeatherProvider};
    use crate::infrastructure::circuit_breaker::CircuitBreaker;
    use crate::infrastructure::rate_limiter::RateLimitConfig;
    use async_trait::async_trait;
    use std::time::Duration;

    struct StaticUpstream;

    #[async_trait]
    impl Geocoder for StaticUpstream {
        async fn geocode(&self, city: &str) -> Result<Vec<GeoCandidate>, UpstreamError> {
            if city == "Paris" {
                Ok(vec![GeoCandidate {
                    latitude: 48.85341,
                    longitude: 2.3488,
                }])
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for StaticUpstream {
        async fn fetch_current(
            &self,
            _location: GeoCandidate,
        ) -> Result<CurrentConditions, UpstreamError> {
            Ok(CurrentConditions {
                temperature: 15.5,
                wind_speed: 12.3,
                weather_code: 1,
            })
        }
    }

    /// Cache that reports itself down.
    struct DisconnectedCache;

    #[async_trait]
    impl CacheStore for DisconnectedCache {
        async fn get(&self, _key: &str) -> Option<StoredWeather> {
            None
        }
        async fn set(&self, _key: &str, _value: &StoredWeather) -> bool {
            false
        }
        async fn get_stale(&self, _key: &str) -> Option<StoredWeather> {
            None
        }
        async fn is_connected(&self) -> bool {
            false
        }
    }

    fn state_with_cache(cache: Arc<dyn CacheStore>) -> ApiState {
        let upstream = Arc::new(StaticUpstream);
        let metrics = Arc::new(AtomicMetricsStore::new());
        let service = Arc::new(WeatherService::new(
            cache.clone(),
            upstream.clone(),
            upstream,
            Arc::new(CircuitBreaker::default()),
            metrics.clone(),
        ));
        ApiState {
            service,
            cache,
            metrics,
            limiter: Arc::new(RateLimiter::new(RateLimitConfig::default())),
        }
    }

    fn state() -> ApiState {
        state_with_cache(Arc::new(MemoryCacheStore::new(Duration::from_secs(60))))
    }

    #[tokio::test]
    async fn test_get_weather_returns_record() {
        let result = get_weather(
            State(state()),
            Query(WeatherQuery {
                city: Some("Paris".to_string()),
            }),
        )
        .await;

        let Json(record) = result.unwrap();
        assert_eq!(record.city, "Paris");
        assert_eq!(record.temperature, 15.5);
        assert!(!record.cached);
    }

    #[tokio::test]
    async fn test_get_weather_missing_city_is_bad_request() {
        let result = get_weather(State(state()), Query(WeatherQuery { city: None })).await;

        let response = result.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_weather_unknown_city_is_bad_request() {
        let result = get_weather(
            State(state()),
            Query(WeatherQuery {
                city: Some("Atlantis".to_string()),
            }),
        )
        .await;

        let response = result.unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health_reports_healthy_with_cache() {
        let Json(body) = health(State(state())).await;
        assert_eq!(body.status, "healthy");
        assert!(body.cache_connected);
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn test_health_degrades_without_cache() {
        let Json(body) = health(State(state_with_cache(Arc::new(DisconnectedCache)))).await;
        assert_eq!(body.status, "degraded");
        assert!(!body.cache_connected);
    }

    #[tokio::test]
    async fn test_readiness_fails_without_cache() {
        let result = readiness(State(state_with_cache(Arc::new(DisconnectedCache)))).await;
        let response = result.unwrap_err();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_readiness_succeeds_with_cache() {
        let result = readiness(State(state())).await;
        let Json(body) = result.unwrap();
        assert_eq!(body.status, "ready");
    }

    #[tokio::test]
    async fn test_metrics_snapshot_reflects_lookups() {
        let state = state();

        get_weather(
            State(state.clone()),
            Query(WeatherQuery {
                city: Some("Paris".to_string()),
            }),
        )
        .await
        .unwrap();

        let Json(snap) = metrics_snapshot(State(state)).await;
        assert_eq!(snap.lookups, 1);
        assert_eq!(snap.cache_misses, 1);
    }

    #[test]
    fn test_error_mapping_covers_all_classes() {
        let cases = [
            (LookupError::InvalidCity, StatusCode::BAD_REQUEST),
            (
                LookupError::CityNotFound("x".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                LookupError::Unavailable("down".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                LookupError::Internal("boom".to_string()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(lookup_error_response(&err).status(), expected);
        }
    }
}
