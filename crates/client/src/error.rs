use learnspace_core::error::CoreError;

/// Errors surfaced by the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Credentials were rejected or the session expired.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected locally or by the server.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Any other non-2xx response.
    #[error("API error ({status} {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// The call did not finish within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Network, TLS or decoding failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The owner was torn down while the call was in flight.
    #[error("Cancelled")]
    Cancelled,

    /// The identity was created but inserting its profile failed.
    #[error("Signed up, but the profile could not be saved: {source}")]
    ProfileIncomplete {
        #[source]
        source: Box<ClientError>,
    },

    /// The operation needs a signed-in identity.
    #[error("Not signed in")]
    NotSignedIn,
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { entity, id } => {
                ClientError::NotFound(format!("{entity} with id {id}"))
            }
            CoreError::Unauthorized(msg) => ClientError::Unauthorized(msg),
            other => ClientError::Validation(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}
