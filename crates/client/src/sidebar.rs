//! Sidebar lists kept fresh by change events.
//!
//! The sidebar shows the identity's classrooms and prompt sessions. After
//! [`Sidebar::start`] it refetches a list whenever an event for that
//! topic and identity reaches the bus, whether it came from a local
//! mutation, a [`signal`](crate::signal::signal) or the realtime stream.

use std::sync::Arc;

use learnspace_core::types::DbId;
use learnspace_events::{ChangeBus, ChangeTopic};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::collection::{ClassroomCollection, PromptSessionCollection};

/// Topics the sidebar listens to.
pub const SIDEBAR_TOPICS: [ChangeTopic; 2] = [ChangeTopic::Classrooms, ChangeTopic::PromptSessions];

struct Listener {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct Sidebar {
    classrooms: Arc<ClassroomCollection>,
    sessions: Arc<PromptSessionCollection>,
    bus: Arc<ChangeBus>,
    listener: Mutex<Option<Listener>>,
}

impl Sidebar {
    pub fn new(
        classrooms: Arc<ClassroomCollection>,
        sessions: Arc<PromptSessionCollection>,
        bus: Arc<ChangeBus>,
    ) -> Self {
        Self {
            classrooms,
            sessions,
            bus,
            listener: Mutex::new(None),
        }
    }

    pub fn classrooms(&self) -> &Arc<ClassroomCollection> {
        &self.classrooms
    }

    pub fn sessions(&self) -> &Arc<PromptSessionCollection> {
        &self.sessions
    }

    /// Load both lists for `user_id` and start refetching on change events.
    ///
    /// Restarting for another identity replaces the previous listener.
    pub async fn start(&self, user_id: DbId) {
        self.stop_listener().await;

        // Subscribe before the initial fetch so no event is missed.
        let mut subscription = self.bus.subscribe_scoped(user_id, SIDEBAR_TOPICS);

        self.classrooms.resume();
        self.sessions.resume();
        self.classrooms.set_user(Some(user_id)).await;
        self.sessions.set_user(Some(user_id)).await;
        tokio::join!(self.classrooms.refetch(), self.sessions.refetch());

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let classrooms = Arc::clone(&self.classrooms);
        let sessions = Arc::clone(&self.sessions);

        let handle = tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = token.cancelled() => break,
                    event = subscription.recv() => event,
                };
                let Some(event) = event else { break };
                tracing::debug!(topic = %event.topic, kind = ?event.kind, user_id, "Sidebar refresh");
                match event.topic {
                    ChangeTopic::Classrooms => classrooms.refetch().await,
                    ChangeTopic::PromptSessions => sessions.refetch().await,
                    _ => {}
                }
            }
            tracing::debug!(user_id, "Sidebar listener stopped");
        });

        *self.listener.lock().await = Some(Listener { cancel, handle });
    }

    /// Stop listening, cancel in-flight fetches and clear both lists.
    pub async fn stop(&self) {
        self.stop_listener().await;
        self.classrooms.cancel();
        self.sessions.cancel();
        self.classrooms.set_user(None).await;
        self.sessions.set_user(None).await;
        self.classrooms.refetch().await;
        self.sessions.refetch().await;
    }

    pub async fn is_running(&self) -> bool {
        self.listener.lock().await.is_some()
    }

    async fn stop_listener(&self) {
        if let Some(listener) = self.listener.lock().await.take() {
            listener.cancel.cancel();
            if let Err(e) = listener.handle.await {
                tracing::warn!(error = %e, "Sidebar listener task failed");
            }
        }
    }
}
