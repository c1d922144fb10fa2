//! Repository for the `module_progress` table.

use learnspace_core::types::DbId;
use sqlx::PgPool;

use crate::models::progress::ModuleProgress;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, module_id, completed, completed_at, created_at";

/// Provides data access for per-user module completion.
pub struct ProgressRepo;

impl ProgressRepo {
    /// Flip the completion flag, creating the row on first toggle.
    ///
    /// The caller checks that the module is visible to `user_id`.
    pub async fn toggle(
        pool: &PgPool,
        user_id: DbId,
        module_id: DbId,
    ) -> Result<ModuleProgress, sqlx::Error> {
        let query = format!(
            "INSERT INTO module_progress (user_id, module_id, completed, completed_at)
             VALUES ($1, $2, true, NOW())
             ON CONFLICT ON CONSTRAINT uq_module_progress_user_module DO UPDATE SET
                completed = NOT module_progress.completed,
                completed_at = CASE WHEN module_progress.completed THEN NULL ELSE NOW() END
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ModuleProgress>(&query)
            .bind(user_id)
            .bind(module_id)
            .fetch_one(pool)
            .await
    }

    /// Progress rows for every module of a classroom that `user_id` has touched.
    pub async fn list_for_classroom(
        pool: &PgPool,
        user_id: DbId,
        classroom_id: DbId,
    ) -> Result<Vec<ModuleProgress>, sqlx::Error> {
        sqlx::query_as::<_, ModuleProgress>(
            "SELECT p.id, p.user_id, p.module_id, p.completed, p.completed_at, p.created_at
             FROM module_progress p
             JOIN modules m ON m.id = p.module_id
             WHERE p.user_id = $1 AND m.classroom_id = $2
             ORDER BY m.step_number ASC",
        )
        .bind(user_id)
        .bind(classroom_id)
        .fetch_all(pool)
        .await
    }
}
