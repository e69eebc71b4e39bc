//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the weather proxy domain.
//! They have no external dependencies beyond serialization.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Current weather for a city, as served to callers.
///
/// The `cached` flag reflects only where this particular response instance
/// originated. It is never written to the backing cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// City name as requested by the caller
    pub city: String,
    /// Current temperature in Celsius
    pub temperature: f64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    /// WMO weather code
    pub weather_code: i64,
    /// Whether this response was served from the cache
    pub cached: bool,
}

/// The cacheable portion of a weather record.
///
/// This is the exact shape persisted to the cache backend: a
/// `WeatherRecord` without the `cached` flag. Expiry is enforced by the
/// store's TTL, not by a timestamp in the payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredWeather {
    pub city: String,
    pub temperature: f64,
    pub wind_speed: f64,
    pub weather_code: i64,
}

impl StoredWeather {
    /// Rehydrate a serving record, tagging where it came from.
    pub fn into_record(self, cached: bool) -> WeatherRecord {
        WeatherRecord {
            city: self.city,
            temperature: self.temperature,
            wind_speed: self.wind_speed,
            weather_code: self.weather_code,
            cached,
        }
    }
}

impl From<&WeatherRecord> for StoredWeather {
    fn from(record: &WeatherRecord) -> Self {
        Self {
            city: record.city.clone(),
            temperature: record.temperature,
            wind_speed: record.wind_speed,
            weather_code: record.weather_code,
        }
    }
}

/// A single geocoding candidate. The lookup service uses only the first.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoCandidate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Current conditions as returned by the weather upstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub wind_speed: f64,
    pub weather_code: i64,
}

/// Outcome of one cache warming run. Ephemeral, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WarmingReport {
    pub success: usize,
    pub failed: usize,
}

/// Derive the cache key for a city name.
///
/// Normalization (lowercase + trim) makes the key case- and
/// whitespace-insensitive; the digest keeps keys fixed-length regardless
/// of input.
pub fn cache_key(city: &str) -> String {
    let normalized = city.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    format!("weather:{:x}", digest)
}
