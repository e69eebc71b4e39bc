//! Application Layer
//!
//! Use-case services orchestrating the domain ports.

pub mod cache_warmer;
pub mod weather_service;

pub use cache_warmer::CacheWarmer;
pub use weather_service::WeatherService;
