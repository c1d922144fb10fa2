//! Timeout and cancellation wrapper shared by stores and collections.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::ClientError;

/// Bounds each backend call by a timeout and a cancellation token.
pub(crate) struct Guard {
    timeout: Duration,
    cancel: Mutex<CancellationToken>,
}

impl Guard {
    pub(crate) fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// The token in effect right now.
    pub(crate) fn token(&self) -> CancellationToken {
        match self.cancel.lock() {
            Ok(token) => token.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub(crate) fn cancel(&self) {
        self.token().cancel();
    }

    /// Replace a cancelled token so the owner can be used again.
    pub(crate) fn reset(&self) {
        let mut token = match self.cancel.lock() {
            Ok(token) => token,
            Err(poisoned) => poisoned.into_inner(),
        };
        if token.is_cancelled() {
            *token = CancellationToken::new();
        }
    }

    /// Run `fut`, failing with `Timeout` or `Cancelled`.
    pub(crate) async fn run<T, F>(&self, fut: F) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        let token = self.token();
        tokio::select! {
            _ = token.cancelled() => Err(ClientError::Cancelled),
            result = tokio::time::timeout(self.timeout, fut) => {
                result.map_err(|_| ClientError::Timeout)?
            }
        }
    }
}
