mod cache_store;
mod geocoder;
mod metrics_store;
mod weather_provider;

pub use cache_store::CacheStore;
pub use geocoder::Geocoder;
pub use metrics_store::{MetricsSnapshot, MetricsStore};
pub use weather_provider::WeatherProvider;
