//! Signed-in identity, profile and token balance.

use std::sync::Arc;
use std::time::Duration;

use learnspace_core::billing::validate_balance;
use learnspace_core::catalog::ToolId;
use learnspace_core::profile::{FavoriteChange, Favorites};
use learnspace_core::types::DbId;
use learnspace_db::models::profile::{CreateProfile, UserProfile};
use learnspace_db::models::user::Identity;
use learnspace_events::{ChangeBus, ChangeEvent, ChangeKind, ChangeTopic};
use tokio::sync::RwLock;

use crate::backend::Backend;
use crate::config::DEFAULT_REQUEST_TIMEOUT;
use crate::error::ClientError;
use crate::guard::Guard;

/// Point-in-time copy of the session state.
#[derive(Debug, Clone, Default)]
pub struct SessionSnapshot {
    pub identity: Option<Identity>,
    pub profile: Option<UserProfile>,
    pub tokens: Option<i32>,
}

impl SessionSnapshot {
    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Favorites as typed catalog ids.
    pub fn favorites(&self) -> Favorites {
        self.profile
            .as_ref()
            .map(|p| Favorites::from_stored(&p.favorites))
            .unwrap_or_default()
    }
}

/// Injected session/profile store with an explicit lifecycle.
///
/// Create one per application, call [`init`](Self::init) on startup and
/// [`teardown`](Self::teardown) on shutdown. Mutations publish
/// `Profile`/`Tokens` events on the shared bus.
pub struct SessionStore {
    backend: Arc<dyn Backend>,
    bus: Arc<ChangeBus>,
    guard: Guard,
    state: RwLock<SessionSnapshot>,
}

impl SessionStore {
    pub fn new(backend: Arc<dyn Backend>, bus: Arc<ChangeBus>) -> Self {
        Self::with_timeout(backend, bus, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(backend: Arc<dyn Backend>, bus: Arc<ChangeBus>, timeout: Duration) -> Self {
        Self {
            backend,
            bus,
            guard: Guard::new(timeout),
            state: RwLock::new(SessionSnapshot::default()),
        }
    }

    /// Restore the current session, then load its profile and balance.
    pub async fn init(&self) -> Result<Option<Identity>, ClientError> {
        self.guard.reset();
        let identity = self.guard.run(self.backend.current_identity()).await?;

        match &identity {
            Some(identity) => {
                tracing::debug!(user_id = identity.id, "Session restored");
                self.write_state(|s| s.identity = Some(identity.clone())).await;
                self.load_profile_and_tokens(identity.id).await;
            }
            None => tracing::debug!("No session to restore"),
        }
        Ok(identity)
    }

    /// Cancel in-flight calls and clear local state.
    pub async fn teardown(&self) {
        self.guard.cancel();
        *self.state.write().await = SessionSnapshot::default();
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.read().await.clone()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.identity.clone()
    }

    /// Sign in. On failure the state is left unchanged.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, ClientError> {
        let identity = self
            .guard
            .run(self.backend.sign_in(email, password))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to login");
                e
            })?;

        self.write_state(|s| {
            *s = SessionSnapshot {
                identity: Some(identity.clone()),
                ..Default::default()
            }
        })
        .await;
        self.load_profile_and_tokens(identity.id).await;
        Ok(identity)
    }

    /// Create an identity, then insert its profile with empty favorites.
    ///
    /// If the profile insert fails the identity stays signed in and
    /// [`ClientError::ProfileIncomplete`] is returned.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        profile: CreateProfile,
    ) -> Result<Identity, ClientError> {
        let identity = self
            .guard
            .run(self.backend.sign_up(email, password))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to signup");
                e
            })?;
        self.write_state(|s| {
            *s = SessionSnapshot {
                identity: Some(identity.clone()),
                ..Default::default()
            }
        })
        .await;

        let profile = match self.guard.run(self.backend.insert_profile(&profile)).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::error!(
                    user_id = identity.id,
                    error = %e,
                    "Identity created but profile insert failed"
                );
                return Err(ClientError::ProfileIncomplete {
                    source: Box::new(e),
                });
            }
        };
        self.write_state(|s| s.profile = Some(profile)).await;
        self.publish(ChangeKind::Created, ChangeTopic::Profile, identity.id);

        match self.guard.run(self.backend.fetch_tokens()).await {
            Ok(tokens) => {
                self.write_state(|s| s.tokens = Some(tokens.balance)).await;
                self.publish(ChangeKind::Refreshed, ChangeTopic::Tokens, identity.id);
            }
            Err(e) => tracing::warn!(user_id = identity.id, error = %e, "Token fetch failed"),
        }
        Ok(identity)
    }

    /// Sign out. Local state is cleared even if the backend call fails.
    pub async fn logout(&self) {
        let user_id = self.state.read().await.identity.as_ref().map(|i| i.id);

        if let Err(e) = self.guard.run(self.backend.sign_out()).await {
            tracing::warn!(error = %e, "Sign-out call failed, clearing local session anyway");
        }
        *self.state.write().await = SessionSnapshot::default();

        if let Some(user_id) = user_id {
            self.publish(ChangeKind::Deleted, ChangeTopic::Profile, user_id);
        }
    }

    /// Add or remove a catalog tool from the favorites.
    ///
    /// Reads the stored favorites, toggles `raw_key` and writes the full
    /// set back. Concurrent writers race; the last write wins.
    pub async fn toggle_favorite(&self, raw_key: &str) -> Result<FavoriteChange, ClientError> {
        let tool = ToolId::parse(raw_key)?;
        let user_id = self.require_user().await?;

        let current = self
            .guard
            .run(self.backend.fetch_profile())
            .await?
            .ok_or_else(|| ClientError::NotFound("profile".into()))?;

        let mut favorites = Favorites::from_stored(&current.favorites);
        let change = favorites.toggle(tool);

        let profile = self
            .guard
            .run(self.backend.write_favorites(&favorites.to_stored()))
            .await?;
        tracing::debug!(user_id, tool = raw_key, ?change, "Favorite toggled");

        self.write_state(|s| s.profile = Some(profile)).await;
        self.publish(ChangeKind::Updated, ChangeTopic::Profile, user_id);
        Ok(change)
    }

    /// Set the token balance to an absolute value.
    pub async fn update_tokens(&self, balance: i32) -> Result<i32, ClientError> {
        validate_balance(balance)?;
        let user_id = self.require_user().await?;

        let tokens = self.guard.run(self.backend.write_tokens(balance)).await?;
        self.write_state(|s| s.tokens = Some(tokens.balance)).await;
        self.publish(ChangeKind::Updated, ChangeTopic::Tokens, user_id);
        Ok(tokens.balance)
    }

    /// Refetch the token balance.
    pub async fn refresh_tokens(&self) -> Result<i32, ClientError> {
        let user_id = self.require_user().await?;

        let tokens = self.guard.run(self.backend.fetch_tokens()).await?;
        self.write_state(|s| s.tokens = Some(tokens.balance)).await;
        self.publish(ChangeKind::Refreshed, ChangeTopic::Tokens, user_id);
        Ok(tokens.balance)
    }

    pub async fn update_subscription(&self, is_paid: bool) -> Result<UserProfile, ClientError> {
        let user_id = self.require_user().await?;

        let profile = self.guard.run(self.backend.write_paid(is_paid)).await?;
        self.write_state(|s| s.profile = Some(profile.clone())).await;
        self.publish(ChangeKind::Updated, ChangeTopic::Profile, user_id);
        Ok(profile)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    async fn require_user(&self) -> Result<DbId, ClientError> {
        self.state
            .read()
            .await
            .identity
            .as_ref()
            .map(|i| i.id)
            .ok_or(ClientError::NotSignedIn)
    }

    /// Best-effort load after sign-in. Failures are logged.
    async fn load_profile_and_tokens(&self, user_id: DbId) {
        match self.guard.run(self.backend.fetch_profile()).await {
            Ok(profile) => {
                if profile.is_none() {
                    tracing::warn!(user_id, "Signed in without a profile");
                }
                self.write_state(|s| s.profile = profile).await;
                self.publish(ChangeKind::Refreshed, ChangeTopic::Profile, user_id);
            }
            Err(e) => tracing::warn!(user_id, error = %e, "Profile fetch failed"),
        }

        match self.guard.run(self.backend.fetch_tokens()).await {
            Ok(tokens) => {
                self.write_state(|s| s.tokens = Some(tokens.balance)).await;
                self.publish(ChangeKind::Refreshed, ChangeTopic::Tokens, user_id);
            }
            Err(e) => tracing::warn!(user_id, error = %e, "Token fetch failed"),
        }
    }

    /// Apply `f` unless the store has been torn down.
    async fn write_state(&self, f: impl FnOnce(&mut SessionSnapshot)) {
        if self.guard.token().is_cancelled() {
            return;
        }
        f(&mut *self.state.write().await);
    }

    fn publish(&self, kind: ChangeKind, topic: ChangeTopic, user_id: DbId) {
        self.bus.publish(ChangeEvent::new(topic, kind, user_id));
    }
}
