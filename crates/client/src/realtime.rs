//! Feeds the server's realtime change stream into a local [`ChangeBus`].
//!
//! [`RealtimeListener::run`] keeps one WebSocket open to
//! `/api/v1/realtime`, republishing every change event frame it receives.
//! Dropped connections are retried with exponential backoff until the
//! cancellation token fires. Each attempt authenticates with the backend's
//! current access token; a 401 handshake triggers a session refresh before
//! the next attempt.

use std::sync::Arc;

use futures::StreamExt;
use learnspace_events::{ChangeBus, ChangeEvent};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_util::sync::CancellationToken;

use crate::backend::Backend;
use crate::config::ClientConfig;
use crate::reconnect::next_delay;

/// Relays server change events onto a local bus.
pub struct RealtimeListener {
    backend: Arc<dyn Backend>,
    config: ClientConfig,
    bus: Arc<ChangeBus>,
}

impl RealtimeListener {
    /// The socket URL is rebuilt from `backend`'s current access token on
    /// every connect attempt, so reconnects pick up refreshed tokens.
    pub fn new(backend: Arc<dyn Backend>, config: ClientConfig, bus: Arc<ChangeBus>) -> Self {
        Self {
            backend,
            config,
            bus,
        }
    }

    /// Run on a background task until `cancel` fires.
    pub fn spawn(self, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }

    /// Connect, relay, reconnect. Returns once `cancel` fires.
    pub async fn run(self, cancel: CancellationToken) {
        let reconnect = &self.config.reconnect;
        let endpoint = redact(&self.config.realtime_url("")).to_string();
        let mut delay = reconnect.initial_delay;
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let token = tokio::select! {
                _ = cancel.cancelled() => break,
                token = self.token() => token,
            };

            match token {
                None => {
                    tracing::debug!(attempt, "Realtime waiting for a signed-in session");
                }
                Some(token) => {
                    let url = self.config.realtime_url(&token);
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        result = connect_async(url.as_str()) => match result {
                            Ok((mut stream, _response)) => {
                                tracing::info!(endpoint = %endpoint, attempt, "Realtime connected");
                                delay = reconnect.initial_delay;
                                attempt = 0;

                                loop {
                                    let frame = tokio::select! {
                                        _ = cancel.cancelled() => {
                                            let _ = stream.close(None).await;
                                            tracing::info!("Realtime listener stopped");
                                            return;
                                        }
                                        frame = stream.next() => frame,
                                    };
                                    match frame {
                                        Some(Ok(Message::Text(text))) => self.relay(&text),
                                        Some(Ok(Message::Close(frame))) => {
                                            tracing::info!(?frame, "Realtime connection closed by server");
                                            break;
                                        }
                                        Some(Ok(_)) => {}
                                        Some(Err(e)) => {
                                            tracing::warn!(error = %e, "Realtime receive error");
                                            break;
                                        }
                                        None => break,
                                    }
                                }
                            }
                            Err(WsError::Http(response)) if response.status() == StatusCode::UNAUTHORIZED => {
                                tracing::info!(endpoint = %endpoint, attempt, "Realtime token rejected, refreshing session");
                                self.refresh().await;
                            }
                            Err(e) => {
                                tracing::warn!(
                                    endpoint = %endpoint,
                                    error = %e,
                                    "Realtime connect attempt {attempt} failed",
                                );
                            }
                        },
                    }
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
            delay = next_delay(delay, reconnect);
        }

        tracing::info!("Realtime listener stopped");
    }

    /// Current access token, refreshing the session once if there is none.
    async fn token(&self) -> Option<String> {
        if let Some(token) = self.backend.access_token().await {
            return Some(token);
        }
        self.refresh().await;
        self.backend.access_token().await
    }

    async fn refresh(&self) {
        if let Err(e) = self.backend.current_identity().await {
            tracing::warn!(error = %e, "Realtime session refresh failed");
        }
    }

    fn relay(&self, text: &str) {
        match parse_event(text) {
            Some(event) => self.bus.publish(event),
            None => tracing::debug!(len = text.len(), "Ignoring unrecognised realtime frame"),
        }
    }
}

/// Decode one text frame. Heartbeats and unknown payloads yield `None`.
pub fn parse_event(text: &str) -> Option<ChangeEvent> {
    serde_json::from_str(text).ok()
}

/// Strip the query string so the access token never reaches the logs.
fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}
