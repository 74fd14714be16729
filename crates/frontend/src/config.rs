/// Front-end server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct FrontendConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8083`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Base URL of the backend API (default: `http://localhost:8000`).
    pub backend_url: String,
    /// Per-request timeout for backend calls in seconds (default: `30`).
    pub backend_timeout_secs: u64,
    /// Suggested status polling interval handed to clients (default: `5`).
    pub poll_interval_secs: u64,
}

impl FrontendConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `FRONTEND_HOST`        | `0.0.0.0`                  |
    /// | `FRONTEND_PORT`        | `8083`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:8083`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `BACKEND_URL`          | `http://localhost:8000`    |
    /// | `BACKEND_TIMEOUT_SECS` | `30`                       |
    /// | `POLL_INTERVAL_SECS`   | `5`                        |
    pub fn from_env() -> Self {
        let host = std::env::var("FRONTEND_HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("FRONTEND_PORT")
            .unwrap_or_else(|_| "8083".into())
            .parse()
            .expect("FRONTEND_PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8083".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let backend_url = std::env::var("BACKEND_URL")
            .unwrap_or_else(|_| "http://localhost:8000".into())
            .trim_end_matches('/')
            .to_string();

        let backend_timeout_secs: u64 = std::env::var("BACKEND_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("BACKEND_TIMEOUT_SECS must be a valid u64");

        let poll_interval_secs: u64 = std::env::var("POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("POLL_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            backend_url,
            backend_timeout_secs,
            poll_interval_secs,
        }
    }
}
