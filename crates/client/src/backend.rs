//! The seam between client state and the server.

use async_trait::async_trait;
use learnspace_core::types::DbId;
use learnspace_db::models::classroom::{Classroom, CreateClassroom, UpdateClassroom};
use learnspace_db::models::module::{CreateModule, Module, UpdateModule};
use learnspace_db::models::profile::{CreateProfile, UserProfile};
use learnspace_db::models::prompt::{
    CreatePromptMessage, CreatePromptSession, PromptMessage, PromptSession, UpdatePromptSession,
};
use learnspace_db::models::token::TokenBalance;
use learnspace_db::models::user::Identity;

use crate::error::ClientError;

/// Everything the client reads from or writes to the backend.
///
/// Implementations hold the current credentials; every call acts as the
/// signed-in identity. [`HttpBackend`](crate::http::HttpBackend) talks to
/// the API server; tests substitute an in-memory double.
#[async_trait]
pub trait Backend: Send + Sync {
    // --- Auth ---
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ClientError>;
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, ClientError>;
    async fn sign_out(&self) -> Result<(), ClientError>;
    /// The identity behind stored credentials, if they are still valid.
    async fn current_identity(&self) -> Result<Option<Identity>, ClientError>;
    /// Access token for the realtime socket.
    async fn access_token(&self) -> Option<String>;

    // --- Profile and tokens ---
    async fn fetch_profile(&self) -> Result<Option<UserProfile>, ClientError>;
    async fn insert_profile(&self, input: &CreateProfile) -> Result<UserProfile, ClientError>;
    async fn write_favorites(&self, favorites: &[String]) -> Result<UserProfile, ClientError>;
    async fn write_paid(&self, is_paid: bool) -> Result<UserProfile, ClientError>;
    async fn fetch_tokens(&self) -> Result<TokenBalance, ClientError>;
    async fn write_tokens(&self, balance: i32) -> Result<TokenBalance, ClientError>;

    // --- Classrooms ---
    async fn list_classrooms(&self) -> Result<Vec<Classroom>, ClientError>;
    async fn create_classroom(&self, input: &CreateClassroom) -> Result<Classroom, ClientError>;
    async fn update_classroom(
        &self,
        id: DbId,
        input: &UpdateClassroom,
    ) -> Result<Classroom, ClientError>;
    async fn delete_classroom(&self, id: DbId) -> Result<(), ClientError>;

    // --- Modules ---
    async fn list_modules(&self, classroom_id: DbId) -> Result<Vec<Module>, ClientError>;
    async fn create_module(
        &self,
        classroom_id: DbId,
        input: &CreateModule,
    ) -> Result<Module, ClientError>;
    async fn update_module(&self, id: DbId, input: &UpdateModule) -> Result<Module, ClientError>;
    async fn delete_module(&self, id: DbId) -> Result<(), ClientError>;
    async fn reorder_modules(
        &self,
        classroom_id: DbId,
        module_ids: &[DbId],
    ) -> Result<Vec<Module>, ClientError>;

    // --- Prompt sessions ---
    async fn list_prompt_sessions(&self) -> Result<Vec<PromptSession>, ClientError>;
    async fn create_prompt_session(
        &self,
        input: &CreatePromptSession,
    ) -> Result<PromptSession, ClientError>;
    async fn update_prompt_session(
        &self,
        id: DbId,
        input: &UpdatePromptSession,
    ) -> Result<PromptSession, ClientError>;
    async fn delete_prompt_session(&self, id: DbId) -> Result<(), ClientError>;

    // --- Prompt messages ---
    async fn list_prompt_messages(&self, session_id: DbId)
        -> Result<Vec<PromptMessage>, ClientError>;
    async fn append_prompt_message(
        &self,
        session_id: DbId,
        input: &CreatePromptMessage,
    ) -> Result<PromptMessage, ClientError>;
}
