use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // HTTP server settings
    pub listen_addr: String,
    pub debug: bool,

    // Cache backend settings
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: i64,
    pub redis_password: Option<String>,
    pub cache_ttl_secs: u64,

    // Upstream API settings
    pub geocoding_api_url: String,
    pub weather_api_url: String,
    pub request_timeout_secs: u64,

    // Circuit breaker settings
    pub breaker_fail_max: u32,
    pub breaker_reset_secs: u64,

    // Cache warming settings
    pub warming_enabled: bool,
    pub popular_cities: Vec<String>,

    // Rate limiting settings
    pub rate_limit_max_requests: u64,
    pub rate_limit_window_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            debug: false,
            redis_host: "redis".to_string(),
            redis_port: 6379,
            redis_db: 0,
            redis_password: None,
            cache_ttl_secs: 300,
            geocoding_api_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            weather_api_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            request_timeout_secs: 10,
            breaker_fail_max: 5,
            breaker_reset_secs: 60,
            warming_enabled: true,
            popular_cities: default_cities(),
            rate_limit_max_requests: 100,
            rate_limit_window_secs: 60,
        }
    }
}

impl Config {
    /// Build the Redis connection URL from host/port/db/credentials.
    pub fn redis_url(&self) -> String {
        match &self.redis_password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.redis_host, self.redis_port, self.redis_db
            ),
            None => format!("redis://{}:{}/{}", self.redis_host, self.redis_port, self.redis_db),
        }
    }
}

fn default_cities() -> Vec<String> {
    [
        "Netanya", "Raanana", "Paris", "London", "New York", "Tokyo", "Berlin", "Sydney",
        "Moscow", "Dubai", "Singapore", "Los Angeles",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub fn load_config() -> anyhow::Result<Config> {
    let listen_addr = std::env::var("WEATHER_PROXY_LISTEN_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8000".to_string());

    let debug = std::env::var("DEBUG").is_ok();

    let redis_host = std::env::var("WEATHER_PROXY_REDIS_HOST")
        .unwrap_or_else(|_| "redis".to_string());

    let redis_port = std::env::var("WEATHER_PROXY_REDIS_PORT")
        .unwrap_or_else(|_| "6379".to_string())
        .parse()
        .unwrap_or(6379);

    let redis_db = std::env::var("WEATHER_PROXY_REDIS_DB")
        .unwrap_or_else(|_| "0".to_string())
        .parse()
        .unwrap_or(0);

    let redis_password = std::env::var("WEATHER_PROXY_REDIS_PASSWORD").ok();

    let cache_ttl_secs = std::env::var("WEATHER_PROXY_CACHE_TTL_SECS")
        .unwrap_or_else(|_| "300".to_string())
        .parse()
        .unwrap_or(300);

    let geocoding_api_url = std::env::var("WEATHER_PROXY_GEOCODING_API_URL")
        .unwrap_or_else(|_| "https://geocoding-api.open-meteo.com/v1/search".to_string());

    let weather_api_url = std::env::var("WEATHER_PROXY_WEATHER_API_URL")
        .unwrap_or_else(|_| "https://api.open-meteo.com/v1/forecast".to_string());

    let request_timeout_secs = std::env::var("WEATHER_PROXY_REQUEST_TIMEOUT_SECS")
        .unwrap_or_else(|_| "10".to_string())
        .parse()
        .unwrap_or(10);

    let breaker_fail_max = std::env::var("WEATHER_PROXY_BREAKER_FAIL_MAX")
        .unwrap_or_else(|_| "5".to_string())
        .parse()
        .unwrap_or(5);

    let breaker_reset_secs = std::env::var("WEATHER_PROXY_BREAKER_RESET_SECS")
        .unwrap_or_else(|_| "60".to_string())
        .parse()
        .unwrap_or(60);

    let warming_enabled = std::env::var("WEATHER_PROXY_WARMING_ENABLED")
        .map(|v| v == "1" || v.to_lowercase() == "true")
        .unwrap_or(true);

    let popular_cities = std::env::var("WEATHER_PROXY_POPULAR_CITIES")
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_else(|_| default_cities());

    let rate_limit_max_requests = std::env::var("WEATHER_PROXY_RATE_LIMIT_MAX")
        .unwrap_or_else(|_| "100".to_string())
        .parse()
        .unwrap_or(100);

    let rate_limit_window_secs = std::env::var("WEATHER_PROXY_RATE_LIMIT_WINDOW_SECS")
        .unwrap_or_else(|_| "60".to_string())
        .parse()
        .unwrap_or(60);

    Ok(Config {
        listen_addr,
        debug,
        redis_host,
        redis_port,
        redis_db,
        redis_password,
        cache_ttl_secs,
        geocoding_api_url,
        weather_api_url,
        request_timeout_secs,
        breaker_fail_max,
        breaker_reset_secs,
        warming_enabled,
        popular_cities,
        rate_limit_max_requests,
        rate_limit_window_secs,
    })
}
