//! The text-generation seam.

use async_trait::async_trait;

/// Errors from a text generator.
#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The request did not complete within the configured timeout.
    #[error("generation timed out")]
    Timeout,

    /// The endpoint returned a non-2xx status code.
    #[error("generation API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The endpoint answered but carried no candidate text.
    #[error("generation returned no text")]
    EmptyResponse,
}

/// Produces free text for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenAiError>;

    /// Model name used in logs.
    fn model_name(&self) -> &str;
}
