//! Integration tests for the weather lookup flow with Wiremock
//!
//! Drives the real Open-Meteo adapters against mock servers, with the
//! in-memory cache store and a real circuit breaker.

use std::sync::Arc;
use std::time::Duration;
use weather_proxy::adapters::outbound::{AtomicMetricsStore, MemoryCacheStore, OpenMeteoClient};
use weather_proxy::application::WeatherService;
use weather_proxy::config::Config;
use weather_proxy::domain::errors::LookupError;
use weather_proxy::infrastructure::{CircuitBreaker, CircuitBreakerConfig};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server_uri: &str) -> Config {
    Config {
        geocoding_api_url: format!("{server_uri}/v1/search"),
        weather_api_url: format!("{server_uri}/v1/forecast"),
        request_timeout_secs: 5,
        ..Config::default()
    }
}

fn service_for(cfg: &Config, breaker: CircuitBreakerConfig) -> WeatherService {
    let cache = Arc::new(MemoryCacheStore::new(Duration::from_secs(60)));
    let client = Arc::new(OpenMeteoClient::new(cfg).unwrap());
    WeatherService::new(
        cache,
        client.clone(),
        client,
        Arc::new(CircuitBreaker::new(breaker)),
        Arc::new(AtomicMetricsStore::new()),
    )
}

fn paris_geocoding_body() -> serde_json::Value {
    serde_json::json!({
        "results": [
            {
                "id": 2988507,
                "name": "Paris",
                "latitude": 48.85341,
                "longitude": 2.3488,
                "country": "France"
            }
        ]
    })
}

fn mild_forecast_body() -> serde_json::Value {
    serde_json::json!({
        "latitude": 48.85341,
        "longitude": 2.3488,
        "current_weather": {
            "temperature": 15.5,
            "windspeed": 12.3,
            "weathercode": 1,
            "time": "2024-06-01T12:00"
        }
    })
}

/// Fresh lookup hits both upstreams once; the repeat within TTL is served
/// from the cache without touching them again.
#[tokio::test]
async fn test_paris_lookup_fresh_then_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_geocoding_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("current_weather", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mild_forecast_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cfg = config_for(&mock_server.uri());
    let service = service_for(&cfg, CircuitBreakerConfig::default());

    let fresh = service.get_weather("Paris").await.unwrap();
    assert_eq!(fresh.city, "Paris");
    assert_eq!(fresh.temperature, 15.5);
    assert_eq!(fresh.wind_speed, 12.3);
    assert_eq!(fresh.weather_code, 1);
    assert!(!fresh.cached);

    let repeat = service.get_weather("Paris").await.unwrap();
    assert!(repeat.cached);
    assert_eq!(repeat.temperature, 15.5);
    assert_eq!(repeat.wind_speed, 12.3);
    assert_eq!(repeat.weather_code, 1);
}

/// Empty geocoding results map to a not-found error and the weather
/// endpoint is never called.
#[tokio::test]
async fn test_unknown_city_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mild_forecast_body()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let cfg = config_for(&mock_server.uri());
    let service = service_for(&cfg, CircuitBreakerConfig::default());

    let err = service.get_weather("Atlantis").await.unwrap_err();
    assert!(matches!(err, LookupError::CityNotFound(_)));
}

/// Empty input never reaches the network.
#[tokio::test]
async fn test_empty_city_makes_no_upstream_calls() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_geocoding_body()))
        .expect(0)
        .mount(&mock_server)
        .await;

    let cfg = config_for(&mock_server.uri());
    let service = service_for(&cfg, CircuitBreakerConfig::default());

    let err = service.get_weather("   ").await.unwrap_err();
    assert!(matches!(err, LookupError::InvalidCity));
}

/// A geocoding outage surfaces as unavailability, not as not-found.
#[tokio::test]
async fn test_geocoding_outage_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cfg = config_for(&mock_server.uri());
    let service = service_for(&cfg, CircuitBreakerConfig::default());

    let err = service.get_weather("Paris").await.unwrap_err();
    assert!(matches!(err, LookupError::Unavailable(_)));
}

/// Repeated forecast failures trip the breaker: afterwards lookups fail
/// fast without hitting the forecast endpoint.
#[tokio::test]
async fn test_breaker_opens_after_forecast_failures() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_geocoding_body()))
        .expect(3)
        .mount(&mock_server)
        .await;

    // Only the first two lookups may reach the forecast endpoint
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .expect(2)
        .mount(&mock_server)
        .await;

    let cfg = config_for(&mock_server.uri());
    let service = service_for(
        &cfg,
        CircuitBreakerConfig {
            failure_threshold: 2,
            reset_timeout: Duration::from_secs(60),
        },
    );

    service.get_weather("Paris").await.unwrap_err();
    service.get_weather("Paris").await.unwrap_err();

    let err = service.get_weather("Paris").await.unwrap_err();
    match err {
        LookupError::Unavailable(msg) => assert!(msg.contains("circuit breaker open")),
        other => panic!("expected Unavailable, got {other:?}"),
    }
}

/// After the reset timeout a single successful trial call closes the
/// breaker again.
#[tokio::test]
async fn test_breaker_recovers_once_upstream_heals() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(paris_geocoding_body()))
        .expect(3)
        .mount(&mock_server)
        .await;

    // First forecast call fails and trips the breaker, later ones succeed
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mild_forecast_body()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let cfg = config_for(&mock_server.uri());
    let service = service_for(
        &cfg,
        CircuitBreakerConfig {
            failure_threshold: 1,
            reset_timeout: Duration::from_millis(200),
        },
    );

    // Trip the breaker
    service.get_weather("Paris").await.unwrap_err();

    // Still open: rejected without an upstream forecast call
    let err = service.get_weather("Paris").await.unwrap_err();
    match err {
        LookupError::Unavailable(msg) => assert!(msg.contains("circuit breaker open")),
        other => panic!("expected Unavailable, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_millis(300)).await;

    // Trial call goes through and recovers
    let record = service.get_weather("Paris").await.unwrap();
    assert_eq!(record.temperature, 15.5);
    assert!(!record.cached);
}
