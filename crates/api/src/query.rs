//! Shared query parameter types for API handlers.

use serde::Deserialize;

/// Default number of digests returned by the news feed.
pub const DEFAULT_DIGEST_LIMIT: i64 = 20;

/// Upper bound on `?limit=`.
pub const MAX_DIGEST_LIMIT: i64 = 100;

/// Query parameters for `GET /digests` (`?channel_id=&limit=`).
#[derive(Debug, Deserialize)]
pub struct DigestParams {
    pub channel_id: Option<String>,
    pub limit: Option<i64>,
}

impl DigestParams {
    /// The requested limit clamped to `1..=MAX_DIGEST_LIMIT`.
    pub fn clamped_limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_DIGEST_LIMIT)
            .clamp(1, MAX_DIGEST_LIMIT)
    }

    /// The channel filter, with blank values treated as absent.
    pub fn channel(&self) -> Option<&str> {
        self.channel_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

/// Query parameters for the realtime socket (`?token=`).
///
/// Browsers cannot set headers on a WebSocket handshake, so the access
/// token travels in the query string.
#[derive(Debug, Deserialize)]
pub struct RealtimeParams {
    pub token: String,
}
