mod atomic_metrics_store;
mod memory_cache_store;
mod open_meteo;
mod redis_cache_store;

pub use atomic_metrics_store::AtomicMetricsStore;
pub use memory_cache_store::MemoryCacheStore;
pub use open_meteo::OpenMeteoClient;
pub use redis_cache_store::RedisCacheStore;
