//! Repository for the `prompt_sessions` table.

use learnspace_core::types::DbId;
use sqlx::PgPool;

use crate::models::prompt::{CreatePromptSession, PromptSession, UpdatePromptSession};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, user_id, title, main_prompt, tags, is_favorite, created_at, updated_at";

/// Provides CRUD operations for prompt sessions.
pub struct PromptSessionRepo;

impl PromptSessionRepo {
    /// Insert a new session. `title` is resolved by the caller.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        title: &str,
        input: &CreatePromptSession,
    ) -> Result<PromptSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO prompt_sessions (user_id, title, main_prompt, tags)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PromptSession>(&query)
            .bind(user_id)
            .bind(title)
            .bind(&input.main_prompt)
            .bind(&input.tags)
            .fetch_one(pool)
            .await
    }

    /// List sessions owned by `user_id`, most recently active first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<PromptSession>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prompt_sessions
             WHERE user_id = $1
             ORDER BY updated_at DESC, id DESC"
        );
        sqlx::query_as::<_, PromptSession>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find a session owned by `user_id`.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<PromptSession>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM prompt_sessions WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, PromptSession>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a session. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        input: &UpdatePromptSession,
    ) -> Result<Option<PromptSession>, sqlx::Error> {
        let query = format!(
            "UPDATE prompt_sessions SET
                title = COALESCE($3, title),
                main_prompt = COALESCE($4, main_prompt),
                tags = COALESCE($5, tags),
                is_favorite = COALESCE($6, is_favorite)
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PromptSession>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.main_prompt)
            .bind(&input.tags)
            .bind(input.is_favorite)
            .fetch_optional(pool)
            .await
    }

    /// Delete a session and its messages. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM prompt_sessions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Bump `updated_at` so the session sorts first in the list.
    pub async fn touch(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE prompt_sessions SET updated_at = NOW() WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
