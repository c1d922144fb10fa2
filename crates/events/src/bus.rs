//! In-process change bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`ChangeBus`] is shared via `Arc<ChangeBus>`. Publishing never blocks
//! and never fails; a bus with no subscribers drops the event.

use std::collections::HashSet;

use learnspace_core::types::DbId;
use tokio::sync::broadcast;

use crate::event::{ChangeEvent, ChangeTopic};

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out bus for [`ChangeEvent`]s.
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest events are dropped and slow
    /// receivers observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: ChangeEvent) {
        tracing::trace!(
            topic = %event.topic,
            kind = ?event.kind,
            user_id = event.user_id,
            "Publishing change event"
        );
        // A send error only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to every event published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Subscribe to events for `user_id` on the given topics only.
    ///
    /// An empty topic list matches every topic.
    pub fn subscribe_scoped(
        &self,
        user_id: DbId,
        topics: impl IntoIterator<Item = ChangeTopic>,
    ) -> ScopedSubscription {
        ScopedSubscription {
            receiver: self.sender.subscribe(),
            user_id,
            topics: topics.into_iter().collect(),
        }
    }

    /// Number of live receivers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// A bus receiver filtered to one identity and a set of topics.
pub struct ScopedSubscription {
    receiver: broadcast::Receiver<ChangeEvent>,
    user_id: DbId,
    topics: HashSet<ChangeTopic>,
}

impl ScopedSubscription {
    pub fn user_id(&self) -> DbId {
        self.user_id
    }

    /// Whether `event` passes this subscription's filter.
    pub fn matches(&self, event: &ChangeEvent) -> bool {
        event.user_id == self.user_id
            && (self.topics.is_empty() || self.topics.contains(&event.topic))
    }

    /// Wait for the next matching event.
    ///
    /// Lagged gaps are skipped with a warning. Returns `None` once the bus
    /// has been dropped.
    pub async fn recv(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        user_id = self.user_id,
                        "Change subscription lagged, some events were dropped"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
