use std::time::Duration;

use crate::reconnect::ReconnectConfig;

/// Default per-call timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root, e.g. `http://localhost:3000`.
    pub base_url: String,
    /// Upper bound on every backend call.
    pub request_timeout: Duration,
    /// Backoff for the realtime socket.
    pub reconnect: ReconnectConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `LEARNSPACE_API_URL`      | `http://localhost:3000` |
    /// | `LEARNSPACE_TIMEOUT_SECS` | `15`                    |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = std::env::var("LEARNSPACE_API_URL").unwrap_or(defaults.base_url);

        let request_timeout = std::env::var("LEARNSPACE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Self {
            base_url,
            request_timeout,
            reconnect: defaults.reconnect,
        }
    }

    /// `{base_url}/api/v1`.
    pub fn api_url(&self) -> String {
        format!("{}/api/v1", self.base_url.trim_end_matches('/'))
    }

    /// WebSocket URL of the realtime change feed for `access_token`.
    pub fn realtime_url(&self, access_token: &str) -> String {
        let api = self.api_url();
        let ws = if let Some(rest) = api.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = api.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            api
        };
        format!("{ws}/realtime?token={access_token}")
    }
}
