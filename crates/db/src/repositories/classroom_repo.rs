//! Repository for the `classrooms` table.

use learnspace_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::classroom::{Classroom, CreateClassroom, UpdateClassroom};
use crate::models::module::{CreateModule, Module};

/// Column list including the derived module count. The subquery references
/// the outer `classrooms` row, so it also works inside `RETURNING`.
const COLUMNS: &str = "id, user_id, name, description, color, \
    (SELECT COUNT(*) FROM modules m WHERE m.classroom_id = classrooms.id) AS module_count, \
    created_at, updated_at";

/// Provides CRUD operations for classrooms.
pub struct ClassroomRepo;

impl ClassroomRepo {
    /// Insert a new classroom, returning the created row.
    ///
    /// `color` must already be resolved (defaulted and validated) by the caller.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateClassroom,
        color: &str,
    ) -> Result<Classroom, sqlx::Error> {
        let query = format!(
            "INSERT INTO classrooms (user_id, name, description, color)
             VALUES ($1, $2, COALESCE($3, ''), $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Classroom>(&query)
            .bind(user_id)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(color)
            .fetch_one(pool)
            .await
    }

    /// Insert a classroom together with its modules, numbered `1..=N` in
    /// the given order. Either every row is written or none is.
    pub async fn create_with_modules(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateClassroom,
        color: &str,
        modules: &[CreateModule],
    ) -> Result<(Classroom, Vec<Module>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let classroom_id = sqlx::query_scalar::<_, DbId>(
            "INSERT INTO classrooms (user_id, name, description, color)
             VALUES ($1, $2, COALESCE($3, ''), $4)
             RETURNING id",
        )
        .bind(user_id)
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(color)
        .fetch_one(&mut *tx)
        .await?;

        let mut created = Vec::with_capacity(modules.len());
        for (step, module) in (1i32..).zip(modules) {
            let row = sqlx::query_as::<_, Module>(
                "INSERT INTO modules (classroom_id, title, description, step_number, content, video_digests)
                 VALUES ($1, $2, COALESCE($3, ''), $4, $5, $6)
                 RETURNING id, classroom_id, title, description, step_number,
                           content, video_digests, created_at, updated_at",
            )
            .bind(classroom_id)
            .bind(module.title.trim())
            .bind(&module.description)
            .bind(step)
            .bind(Json(&module.content))
            .bind(Json(&module.video_digests))
            .fetch_one(&mut *tx)
            .await?;
            created.push(row);
        }

        // Selected after the inserts so module_count includes them.
        let query = format!("SELECT {COLUMNS} FROM classrooms WHERE id = $1");
        let classroom = sqlx::query_as::<_, Classroom>(&query)
            .bind(classroom_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((classroom, created))
    }

    /// List all classrooms owned by `user_id`, newest first.
    pub async fn list_for_user(pool: &PgPool, user_id: DbId) -> Result<Vec<Classroom>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM classrooms
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Classroom>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find a classroom owned by `user_id`.
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Classroom>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM classrooms WHERE id = $1 AND user_id = $2");
        sqlx::query_as::<_, Classroom>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Update a classroom. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        input: &UpdateClassroom,
    ) -> Result<Option<Classroom>, sqlx::Error> {
        let query = format!(
            "UPDATE classrooms SET
                name = COALESCE($3, name),
                description = COALESCE($4, description),
                color = COALESCE($5, color)
             WHERE id = $1 AND user_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Classroom>(&query)
            .bind(id)
            .bind(user_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(&input.color)
            .fetch_optional(pool)
            .await
    }

    /// Delete a classroom and, by cascade, its modules and their progress.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM classrooms WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
