mod api_server;

pub use api_server::{ApiServer, ApiState};

// Re-export for external use (e.g., integration tests)
#[allow(unused_imports)]
pub use api_server::{router, ErrorResponse, HealthResponse, WeatherQuery};
