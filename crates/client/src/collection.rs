//! Backend-backed lists with refetch-after-write semantics.
//!
//! A [`Collection`] mirrors one list from the backend, scoped to the
//! signed-in identity and, for modules and prompt messages, to a parent
//! id. When the scope is incomplete the list is empty and no backend call
//! is made. Writes go straight to the backend, are followed by a full
//! refetch and publish a [`ChangeEvent`] on the bus.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use learnspace_core::types::DbId;
use learnspace_db::models::classroom::{Classroom, CreateClassroom, UpdateClassroom};
use learnspace_db::models::module::{CreateModule, Module, UpdateModule};
use learnspace_db::models::prompt::{
    CreatePromptMessage, CreatePromptSession, PromptMessage, PromptSession, UpdatePromptSession,
};
use learnspace_events::{ChangeBus, ChangeEvent, ChangeKind, ChangeTopic};
use tokio::sync::RwLock;

use crate::backend::Backend;
use crate::error::ClientError;
use crate::guard::Guard;

/// Observable state of a collection.
#[derive(Debug, Clone)]
pub struct CollectionState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    /// Message of the last failed read, cleared by the next successful one.
    pub error: Option<String>,
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Identity and parent a collection is bound to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scope {
    pub user_id: Option<DbId>,
    pub parent_id: Option<DbId>,
}

/// How to read one kind of list from the backend.
#[async_trait]
pub trait CollectionSource: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;

    /// Topic published after a successful mutation.
    const TOPIC: ChangeTopic;
    /// Whether the list needs a parent id.
    const SCOPED: bool;

    fn id(item: &Self::Item) -> DbId;

    async fn fetch(
        &self,
        backend: &dyn Backend,
        parent: Option<DbId>,
    ) -> Result<Vec<Self::Item>, ClientError>;
}

/// Sources that support create, update and delete.
#[async_trait]
pub trait WritableSource: CollectionSource {
    type Create: Send + Sync;
    type Update: Send + Sync;

    async fn create(
        &self,
        backend: &dyn Backend,
        parent: Option<DbId>,
        input: &Self::Create,
    ) -> Result<Self::Item, ClientError>;

    async fn update(
        &self,
        backend: &dyn Backend,
        id: DbId,
        input: &Self::Update,
    ) -> Result<Self::Item, ClientError>;

    async fn delete(&self, backend: &dyn Backend, id: DbId) -> Result<(), ClientError>;
}

/// A list mirrored from the backend.
pub struct Collection<S: CollectionSource> {
    source: S,
    backend: Arc<dyn Backend>,
    bus: Arc<ChangeBus>,
    guard: Guard,
    scope: RwLock<Scope>,
    state: RwLock<CollectionState<S::Item>>,
}

impl<S: CollectionSource> Collection<S> {
    pub fn new(
        source: S,
        backend: Arc<dyn Backend>,
        bus: Arc<ChangeBus>,
        timeout: Duration,
    ) -> Self {
        Self {
            source,
            backend,
            bus,
            guard: Guard::new(timeout),
            scope: RwLock::new(Scope::default()),
            state: RwLock::new(CollectionState::default()),
        }
    }

    /// Bind to an identity (`None` after sign-out).
    pub async fn set_user(&self, user_id: Option<DbId>) {
        self.scope.write().await.user_id = user_id;
    }

    /// Bind to a parent classroom or prompt session.
    pub async fn set_parent(&self, parent_id: Option<DbId>) {
        self.scope.write().await.parent_id = parent_id;
    }

    pub async fn scope(&self) -> Scope {
        *self.scope.read().await
    }

    pub async fn state(&self) -> CollectionState<S::Item> {
        self.state.read().await.clone()
    }

    pub async fn items(&self) -> Vec<S::Item> {
        self.state.read().await.items.clone()
    }

    /// Cancel in-flight calls; later results are discarded.
    pub fn cancel(&self) {
        self.guard.cancel();
    }

    /// Re-enable the collection after [`cancel`](Self::cancel).
    pub fn resume(&self) {
        self.guard.reset();
    }

    /// Reload the list for the current scope.
    ///
    /// Read failures are stored in [`CollectionState::error`], never returned.
    pub async fn refetch(&self) {
        let scope = self.scope().await;
        let Some((_, parent)) = Self::resolve(scope) else {
            *self.state.write().await = CollectionState::default();
            return;
        };
        if self.guard.token().is_cancelled() {
            return;
        }

        self.state.write().await.loading = true;
        let result = self
            .guard
            .run(self.source.fetch(&*self.backend, parent))
            .await;

        if matches!(result, Err(ClientError::Cancelled)) || self.scope().await != scope {
            self.state.write().await.loading = false;
            return;
        }

        let mut state = self.state.write().await;
        state.loading = false;
        match result {
            Ok(items) => {
                state.items = items;
                state.error = None;
            }
            Err(e) => {
                tracing::warn!(topic = %S::TOPIC, error = %e, "Collection fetch failed");
                state.error = Some(e.to_string());
            }
        }
    }

    /// `(user_id, parent)` when the scope is complete.
    fn resolve(scope: Scope) -> Option<(DbId, Option<DbId>)> {
        let user_id = scope.user_id?;
        if S::SCOPED && scope.parent_id.is_none() {
            return None;
        }
        Some((user_id, scope.parent_id))
    }

    async fn require_scope(&self) -> Result<(DbId, Option<DbId>), ClientError> {
        let scope = self.scope().await;
        if scope.user_id.is_none() {
            return Err(ClientError::NotSignedIn);
        }
        Self::resolve(scope).ok_or_else(|| {
            ClientError::Validation(format!("no parent selected for {}", S::TOPIC))
        })
    }

    fn publish(&self, kind: ChangeKind, user_id: DbId, entity: Option<DbId>, parent: Option<DbId>) {
        let mut event = ChangeEvent::new(S::TOPIC, kind, user_id);
        if let Some(id) = entity {
            event = event.with_entity(id);
        }
        if let Some(id) = parent {
            event = event.with_parent(id);
        }
        self.bus.publish(event);
    }
}

impl<S: WritableSource> Collection<S> {
    /// Create an item, then refetch.
    pub async fn create(&self, input: &S::Create) -> Result<S::Item, ClientError> {
        let (user_id, parent) = self.require_scope().await?;
        let item = self
            .guard
            .run(self.source.create(&*self.backend, parent, input))
            .await?;
        self.refetch().await;
        self.publish(ChangeKind::Created, user_id, Some(S::id(&item)), parent);
        Ok(item)
    }

    /// Update an item, then refetch.
    pub async fn update(&self, id: DbId, input: &S::Update) -> Result<S::Item, ClientError> {
        let (user_id, parent) = self.require_scope().await?;
        let item = self
            .guard
            .run(self.source.update(&*self.backend, id, input))
            .await?;
        self.refetch().await;
        self.publish(ChangeKind::Updated, user_id, Some(id), parent);
        Ok(item)
    }

    /// Delete an item, then refetch.
    pub async fn delete(&self, id: DbId) -> Result<(), ClientError> {
        let (user_id, parent) = self.require_scope().await?;
        self.guard
            .run(self.source.delete(&*self.backend, id))
            .await?;
        self.refetch().await;
        self.publish(ChangeKind::Deleted, user_id, Some(id), parent);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// The identity's classrooms.
pub struct Classrooms;

/// Modules of one classroom, in step order.
pub struct Modules;

/// The identity's prompt sessions.
pub struct PromptSessions;

/// Messages of one prompt session.
pub struct PromptMessages;

pub type ClassroomCollection = Collection<Classrooms>;
pub type ModuleCollection = Collection<Modules>;
pub type PromptSessionCollection = Collection<PromptSessions>;
pub type PromptMessageCollection = Collection<PromptMessages>;

#[async_trait]
impl CollectionSource for Classrooms {
    type Item = Classroom;
    const TOPIC: ChangeTopic = ChangeTopic::Classrooms;
    const SCOPED: bool = false;

    fn id(item: &Classroom) -> DbId {
        item.id
    }

    async fn fetch(
        &self,
        backend: &dyn Backend,
        _parent: Option<DbId>,
    ) -> Result<Vec<Classroom>, ClientError> {
        backend.list_classrooms().await
    }
}

#[async_trait]
impl WritableSource for Classrooms {
    type Create = CreateClassroom;
    type Update = UpdateClassroom;

    async fn create(
        &self,
        backend: &dyn Backend,
        _parent: Option<DbId>,
        input: &CreateClassroom,
    ) -> Result<Classroom, ClientError> {
        backend.create_classroom(input).await
    }

    async fn update(
        &self,
        backend: &dyn Backend,
        id: DbId,
        input: &UpdateClassroom,
    ) -> Result<Classroom, ClientError> {
        backend.update_classroom(id, input).await
    }

    async fn delete(&self, backend: &dyn Backend, id: DbId) -> Result<(), ClientError> {
        backend.delete_classroom(id).await
    }
}

#[async_trait]
impl CollectionSource for Modules {
    type Item = Module;
    const TOPIC: ChangeTopic = ChangeTopic::Modules;
    const SCOPED: bool = true;

    fn id(item: &Module) -> DbId {
        item.id
    }

    async fn fetch(
        &self,
        backend: &dyn Backend,
        parent: Option<DbId>,
    ) -> Result<Vec<Module>, ClientError> {
        match parent {
            Some(classroom_id) => backend.list_modules(classroom_id).await,
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl WritableSource for Modules {
    type Create = CreateModule;
    type Update = UpdateModule;

    async fn create(
        &self,
        backend: &dyn Backend,
        parent: Option<DbId>,
        input: &CreateModule,
    ) -> Result<Module, ClientError> {
        let classroom_id =
            parent.ok_or_else(|| ClientError::Validation("no classroom selected".into()))?;
        backend.create_module(classroom_id, input).await
    }

    async fn update(
        &self,
        backend: &dyn Backend,
        id: DbId,
        input: &UpdateModule,
    ) -> Result<Module, ClientError> {
        backend.update_module(id, input).await
    }

    async fn delete(&self, backend: &dyn Backend, id: DbId) -> Result<(), ClientError> {
        backend.delete_module(id).await
    }
}

impl ModuleCollection {
    /// Write a new module order, then refetch. The server assigns steps
    /// `1..=N` in the given order.
    pub async fn reorder(&self, module_ids: &[DbId]) -> Result<(), ClientError> {
        let (user_id, parent) = self.require_scope().await?;
        let classroom_id =
            parent.ok_or_else(|| ClientError::Validation("no classroom selected".into()))?;
        self.guard
            .run(self.backend.reorder_modules(classroom_id, module_ids))
            .await?;
        self.refetch().await;
        self.publish(ChangeKind::Updated, user_id, None, parent);
        Ok(())
    }
}

#[async_trait]
impl CollectionSource for PromptSessions {
    type Item = PromptSession;
    const TOPIC: ChangeTopic = ChangeTopic::PromptSessions;
    const SCOPED: bool = false;

    fn id(item: &PromptSession) -> DbId {
        item.id
    }

    async fn fetch(
        &self,
        backend: &dyn Backend,
        _parent: Option<DbId>,
    ) -> Result<Vec<PromptSession>, ClientError> {
        backend.list_prompt_sessions().await
    }
}

#[async_trait]
impl WritableSource for PromptSessions {
    type Create = CreatePromptSession;
    type Update = UpdatePromptSession;

    async fn create(
        &self,
        backend: &dyn Backend,
        _parent: Option<DbId>,
        input: &CreatePromptSession,
    ) -> Result<PromptSession, ClientError> {
        backend.create_prompt_session(input).await
    }

    async fn update(
        &self,
        backend: &dyn Backend,
        id: DbId,
        input: &UpdatePromptSession,
    ) -> Result<PromptSession, ClientError> {
        backend.update_prompt_session(id, input).await
    }

    async fn delete(&self, backend: &dyn Backend, id: DbId) -> Result<(), ClientError> {
        backend.delete_prompt_session(id).await
    }
}

#[async_trait]
impl CollectionSource for PromptMessages {
    type Item = PromptMessage;
    const TOPIC: ChangeTopic = ChangeTopic::PromptMessages;
    const SCOPED: bool = true;

    fn id(item: &PromptMessage) -> DbId {
        item.id
    }

    async fn fetch(
        &self,
        backend: &dyn Backend,
        parent: Option<DbId>,
    ) -> Result<Vec<PromptMessage>, ClientError> {
        match parent {
            Some(session_id) => backend.list_prompt_messages(session_id).await,
            None => Ok(Vec::new()),
        }
    }
}

impl PromptMessageCollection {
    /// Append a message and push it onto the local list as returned.
    ///
    /// No refetch and no re-sort: the list keeps arrival order.
    pub async fn append(&self, input: &CreatePromptMessage) -> Result<PromptMessage, ClientError> {
        let (user_id, parent) = self.require_scope().await?;
        let session_id =
            parent.ok_or_else(|| ClientError::Validation("no prompt session selected".into()))?;
        let message = self
            .guard
            .run(self.backend.append_prompt_message(session_id, input))
            .await?;

        if self.scope().await.parent_id == Some(session_id) {
            self.state.write().await.items.push(message.clone());
        }
        self.publish(ChangeKind::Created, user_id, Some(message.id), parent);
        Ok(message)
    }
}
