//! Prompt session and prompt message models and DTOs.

use learnspace_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// A row from the `prompt_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PromptSession {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    /// Topic extracted from the assistant's replies.
    pub main_prompt: Option<String>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a prompt session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePromptSession {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub main_prompt: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// DTO for updating a prompt session. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePromptSession {
    pub title: Option<String>,
    pub main_prompt: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
}

/// A row from the `prompt_messages` table. Append-only.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PromptMessage {
    pub id: DbId,
    pub session_id: DbId,
    /// `"user"` or `"ai"`.
    pub sender: String,
    pub content: String,
    pub suggests_learning_space: bool,
    pub created_at: Timestamp,
}

/// DTO for appending a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePromptMessage {
    pub sender: String,
    pub content: String,
    #[serde(default)]
    pub suggests_learning_space: bool,
}
