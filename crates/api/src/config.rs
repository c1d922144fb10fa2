use std::time::Duration;

use learnspace_genai::GeminiConfig;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Grace period for background tasks after the listener stops (default: `10`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Generative model endpoint used by the edge functions.
    pub genai: GeminiConfig,
    /// Base URL the mocked checkout redirects to.
    pub checkout_base_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                              |
    /// |------------------------|------------------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                            |
    /// | `PORT`                 | `3000`                                               |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`                              |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                                 |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `10`                                                 |
    /// | `GENAI_API_URL`        | `https://generativelanguage.googleapis.com/v1beta`   |
    /// | `GENAI_API_KEY`        | empty                                                |
    /// | `GENAI_MODEL`          | `gemini-1.5-flash`                                   |
    /// | `GENAI_TIMEOUT_SECS`   | `30`                                                 |
    /// | `CHECKOUT_BASE_URL`    | `http://localhost:5173`                              |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let genai_timeout_secs: u64 = std::env::var("GENAI_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("GENAI_TIMEOUT_SECS must be a valid u64");

        let genai = GeminiConfig {
            api_url: std::env::var("GENAI_API_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into()),
            api_key: std::env::var("GENAI_API_KEY").unwrap_or_default(),
            model: std::env::var("GENAI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".into()),
            timeout: Duration::from_secs(genai_timeout_secs),
        };

        let checkout_base_url = std::env::var("CHECKOUT_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5173".into());

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            genai,
            checkout_base_url,
        }
    }
}
