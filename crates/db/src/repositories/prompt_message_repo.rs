//! Repository for the `prompt_messages` table.

use learnspace_core::types::DbId;
use sqlx::PgPool;

use crate::models::prompt::{CreatePromptMessage, PromptMessage};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, session_id, sender, content, suggests_learning_space, created_at";

/// Provides append and list operations for prompt messages.
pub struct PromptMessageRepo;

impl PromptMessageRepo {
    /// Append a message to a session the caller has already checked.
    pub async fn append(
        pool: &PgPool,
        session_id: DbId,
        input: &CreatePromptMessage,
    ) -> Result<PromptMessage, sqlx::Error> {
        let query = format!(
            "INSERT INTO prompt_messages (session_id, sender, content, suggests_learning_space)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PromptMessage>(&query)
            .bind(session_id)
            .bind(&input.sender)
            .bind(&input.content)
            .bind(input.suggests_learning_space)
            .fetch_one(pool)
            .await
    }

    /// List a session's messages in transcript order.
    pub async fn list_for_session(
        pool: &PgPool,
        user_id: DbId,
        session_id: DbId,
    ) -> Result<Vec<PromptMessage>, sqlx::Error> {
        sqlx::query_as::<_, PromptMessage>(
            "SELECT pm.id, pm.session_id, pm.sender, pm.content,
                    pm.suggests_learning_space, pm.created_at
             FROM prompt_messages pm
             JOIN prompt_sessions s ON s.id = pm.session_id
             WHERE pm.session_id = $1 AND s.user_id = $2
             ORDER BY pm.created_at ASC, pm.id ASC",
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
