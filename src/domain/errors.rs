//! Error Taxonomy
//!
//! Typed errors for the lookup path. Callers of the lookup service only
//! ever see a `LookupError`; transport and parsing failures from the
//! upstream adapters are normalized before they cross the service
//! boundary. Cache backend failures never appear here at all: the cache
//! degrades to miss/no-op behavior instead.

use thiserror::Error;

/// Failure modes of a weather lookup, as seen by callers.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Empty or whitespace-only city name. Always the caller's fault.
    #[error("city parameter is required")]
    InvalidCity,

    /// Geocoding yielded zero candidates. Distinct from unavailability.
    #[error("city '{0}' not found")]
    CityNotFound(String),

    /// Breaker open, upstream HTTP failure, or malformed upstream payload.
    #[error("weather service temporarily unavailable: {0}")]
    Unavailable(String),

    /// Anything unexpected, normalized so no raw error type leaks.
    #[error("unexpected error: {0}")]
    Internal(String),
}

impl LookupError {
    /// Whether this error maps to a client-error (4xx) condition.
    pub fn is_client_error(&self) -> bool {
        matches!(self, LookupError::InvalidCity | LookupError::CityNotFound(_))
    }
}

/// Failure talking to an upstream HTTP collaborator.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected payload: {0}")]
    Payload(String),
}
