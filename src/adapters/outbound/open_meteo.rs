//! Open-Meteo Client
//!
//! Implements the Geocoder and WeatherProvider ports against the
//! Open-Meteo geocoding and forecast endpoints.

use crate::config::Config;
use crate::domain::entities::{CurrentConditions, GeoCandidate};
use crate::domain::errors::UpstreamError;
use crate::domain::ports::{Geocoder, WeatherProvider};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Shared HTTP client for both upstream endpoints.
///
/// The endpoints are plain GET-with-query APIs returning JSON; both calls
/// go through one pooled reqwest client with the configured timeout.
pub struct OpenMeteoClient {
    http: reqwest::Client,
    geocoding_url: String,
    weather_url: String,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Option<Vec<GeoCandidate>>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current_weather: Option<CurrentWeatherBody>,
}

/// Wire shape of Open-Meteo's `current_weather` block. Missing numeric
/// fields default to zero, matching what the proxy has always served for
/// partial upstream payloads.
#[derive(Debug, Default, Deserialize)]
struct CurrentWeatherBody {
    #[serde(default)]
    temperature: f64,
    #[serde(default)]
    windspeed: f64,
    #[serde(default)]
    weathercode: i64,
}

impl OpenMeteoClient {
    /// Build the client from configuration.
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .pool_max_idle_per_host(20)
            .pool_idle_timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            geocoding_url: cfg.geocoding_api_url.clone(),
            weather_url: cfg.weather_api_url.clone(),
        })
    }
}

#[async_trait]
impl Geocoder for OpenMeteoClient {
    async fn geocode(&self, city: &str) -> Result<Vec<GeoCandidate>, UpstreamError> {
        let response = self
            .http
            .get(&self.geocoding_url)
            .query(&[
                ("name", city),
                ("count", "1"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Payload(e.to_string()))?;

        Ok(body.results.unwrap_or_default())
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn fetch_current(
        &self,
        location: GeoCandidate,
    ) -> Result<CurrentConditions, UpstreamError> {
        let response = self
            .http
            .get(&self.weather_url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("current_weather", "true".to_string()),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::Request(e.to_string()))?
            .error_for_status()
            .map_err(|e| UpstreamError::Request(e.to_string()))?;

        let body: ForecastResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::Payload(e.to_string()))?;

        let current = body.current_weather.unwrap_or_default();
        Ok(CurrentConditions {
            temperature: current.temperature,
            wind_speed: current.windspeed,
            weather_code: current.weathercode,
        })
    }
}
