//! Geocoder Port
//!
//! Defines the interface for resolving free-text city names to
//! coordinates.

use crate::domain::entities::GeoCandidate;
use crate::domain::errors::UpstreamError;
use async_trait::async_trait;

/// Resolver for city name to coordinate candidates.
///
/// This is an outbound port over a black-box geocoding endpoint.
/// Zero candidates means the city does not exist as far as the upstream
/// is concerned; an `Err` means the endpoint could not be asked at all.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a city name to zero or more candidates, best match first.
    async fn geocode(&self, city: &str) -> Result<Vec<GeoCandidate>, UpstreamError>;
}
