//! Relays server-side change events to realtime sockets.

use std::sync::Arc;

use axum::extract::ws::Message;
use learnspace_events::ChangeEvent;
use tokio::sync::broadcast;

use crate::ws::WsManager;

/// Forwards every [`ChangeEvent`] to the sockets of the identity it concerns.
pub struct ChangeForwarder {
    ws_manager: Arc<WsManager>,
}

impl ChangeForwarder {
    pub fn new(ws_manager: Arc<WsManager>) -> Self {
        Self { ws_manager }
    }

    /// Run until the bus is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<ChangeEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.forward(&event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Change forwarder lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Change bus closed, forwarder shutting down");
                    break;
                }
            }
        }
    }

    async fn forward(&self, event: &ChangeEvent) {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, topic = %event.topic, "Failed to serialize change event");
                return;
            }
        };
        let delivered = self
            .ws_manager
            .send_to_user(event.user_id, Message::Text(text.into()))
            .await;
        tracing::trace!(
            user_id = event.user_id,
            topic = %event.topic,
            delivered,
            "Forwarded change event"
        );
    }
}
