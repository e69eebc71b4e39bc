//! Weather Provider Port
//!
//! Defines the interface for fetching current conditions at a coordinate.

use crate::domain::entities::{CurrentConditions, GeoCandidate};
use crate::domain::errors::UpstreamError;
use async_trait::async_trait;

/// Fetcher for current weather at resolved coordinates.
///
/// This is an outbound port over the weather endpoint, the rate-limited
/// and failure-prone upstream the circuit breaker protects against.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch current conditions for the given coordinates.
    async fn fetch_current(&self, location: GeoCandidate) -> Result<CurrentConditions, UpstreamError>;
}
