//! Repository for the `modules` table.
//!
//! Modules are owned through their classroom, so every query joins
//! `classrooms` on `user_id`. Writes that change the set or order of a
//! classroom's modules run in a transaction that leaves the step numbers
//! at exactly `1..=N`.

use learnspace_core::curriculum::{renumber, validate_reorder};
use learnspace_core::error::CoreError;
use learnspace_core::types::DbId;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::module::{CreateModule, Module, UpdateModule};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "m.id, m.classroom_id, m.title, m.description, m.step_number, \
                        m.content, m.video_digests, m.created_at, m.updated_at";

/// Unqualified column list for `RETURNING` clauses.
const RETURNING: &str = "id, classroom_id, title, description, step_number, \
                          content, video_digests, created_at, updated_at";

/// Provides CRUD and ordering operations for modules.
pub struct ModuleRepo;

impl ModuleRepo {
    /// Append a module after the classroom's last step.
    ///
    /// Returns `None` if the classroom does not exist or is not owned by
    /// `user_id`. The classroom row is locked so concurrent appends receive
    /// distinct step numbers.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        classroom_id: DbId,
        input: &CreateModule,
    ) -> Result<Option<Module>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !lock_owned_classroom(&mut tx, user_id, classroom_id).await? {
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO modules (classroom_id, title, description, step_number, content, video_digests)
             VALUES (
                $1, $2, COALESCE($3, ''),
                (SELECT COALESCE(MAX(step_number), 0) + 1 FROM modules WHERE classroom_id = $1),
                $4, $5
             )
             RETURNING {RETURNING}"
        );
        let module = sqlx::query_as::<_, Module>(&query)
            .bind(classroom_id)
            .bind(input.title.trim())
            .bind(&input.description)
            .bind(Json(&input.content))
            .bind(Json(&input.video_digests))
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(module))
    }

    /// List a classroom's modules by ascending step number.
    pub async fn list_for_classroom(
        pool: &PgPool,
        user_id: DbId,
        classroom_id: DbId,
    ) -> Result<Vec<Module>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM modules m
             JOIN classrooms c ON c.id = m.classroom_id
             WHERE m.classroom_id = $1 AND c.user_id = $2
             ORDER BY m.step_number ASC, m.id ASC"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(classroom_id)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Find a module whose classroom is owned by `user_id`.
    pub async fn find_by_id(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Module>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM modules m
             JOIN classrooms c ON c.id = m.classroom_id
             WHERE m.id = $1 AND c.user_id = $2"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Number of modules in a classroom.
    pub async fn count_for_classroom(pool: &PgPool, classroom_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM modules WHERE classroom_id = $1")
            .bind(classroom_id)
            .fetch_one(pool)
            .await
    }

    /// Update a module. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
        input: &UpdateModule,
    ) -> Result<Option<Module>, sqlx::Error> {
        let query = format!(
            "UPDATE modules SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                content = COALESCE($5, content),
                video_digests = COALESCE($6, video_digests)
             WHERE id = $1
               AND classroom_id IN (SELECT id FROM classrooms WHERE user_id = $2)
             RETURNING {RETURNING}"
        );
        sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .bind(user_id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.content.as_ref().map(Json))
            .bind(input.video_digests.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Delete a module and close the gap in its classroom's step numbers.
    ///
    /// The parent classroom is locked first, so a concurrent reorder or
    /// append sees either the old or the renumbered set. Returns the
    /// classroom id of the removed module, or `None` if it was not found
    /// for this user.
    pub async fn delete(
        pool: &PgPool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<DbId>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let classroom_id = sqlx::query_scalar::<_, DbId>(
            "SELECT m.classroom_id FROM modules m
             JOIN classrooms c ON c.id = m.classroom_id
             WHERE m.id = $1 AND c.user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(classroom_id) = classroom_id else {
            return Ok(None);
        };
        if !lock_owned_classroom(&mut tx, user_id, classroom_id).await? {
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM modules WHERE id = $1 AND classroom_id = $2")
            .bind(id)
            .bind(classroom_id)
            .execute(&mut *tx)
            .await?;
        if removed.rows_affected() == 0 {
            // Deleted by a transaction that held the lock before us.
            return Ok(None);
        }

        let remaining = step_ordered_ids(&mut tx, classroom_id).await?;
        apply_steps(&mut tx, classroom_id, &remaining).await?;

        tx.commit().await?;
        Ok(Some(classroom_id))
    }

    /// Assign steps `1..=N` in the order of `ordered_ids`.
    ///
    /// `ordered_ids` is checked against the classroom's modules while the
    /// classroom row is locked, so it cannot go stale between the check and
    /// the write.
    pub async fn reorder(
        pool: &PgPool,
        user_id: DbId,
        classroom_id: DbId,
        ordered_ids: &[DbId],
    ) -> Result<ReorderOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !lock_owned_classroom(&mut tx, user_id, classroom_id).await? {
            return Ok(ReorderOutcome::ClassroomNotFound);
        }
        let current = step_ordered_ids(&mut tx, classroom_id).await?;
        if let Err(err) = validate_reorder(&current, ordered_ids) {
            return Ok(ReorderOutcome::Rejected(err));
        }
        apply_steps(&mut tx, classroom_id, ordered_ids).await?;

        tx.commit().await?;
        Self::list_for_classroom(pool, user_id, classroom_id)
            .await
            .map(ReorderOutcome::Reordered)
    }
}

/// Result of [`ModuleRepo::reorder`].
#[derive(Debug)]
pub enum ReorderOutcome {
    /// The classroom does not exist or belongs to another user.
    ClassroomNotFound,
    /// The ids are not a permutation of the classroom's current modules.
    Rejected(CoreError),
    /// The modules in their new order.
    Reordered(Vec<Module>),
}

/// Lock the classroom row if `user_id` owns it. Returns whether it exists.
async fn lock_owned_classroom(
    tx: &mut Transaction<'_, Postgres>,
    user_id: DbId,
    classroom_id: DbId,
) -> Result<bool, sqlx::Error> {
    let found = sqlx::query_scalar::<_, DbId>(
        "SELECT id FROM classrooms WHERE id = $1 AND user_id = $2 FOR UPDATE",
    )
    .bind(classroom_id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(found.is_some())
}

/// Module ids of a locked classroom in current step order.
async fn step_ordered_ids(
    tx: &mut Transaction<'_, Postgres>,
    classroom_id: DbId,
) -> Result<Vec<DbId>, sqlx::Error> {
    sqlx::query_scalar::<_, DbId>(
        "SELECT id FROM modules WHERE classroom_id = $1
         ORDER BY step_number ASC, id ASC",
    )
    .bind(classroom_id)
    .fetch_all(&mut **tx)
    .await
}

async fn apply_steps(
    tx: &mut Transaction<'_, Postgres>,
    classroom_id: DbId,
    ordered_ids: &[DbId],
) -> Result<(), sqlx::Error> {
    for (id, step) in renumber(ordered_ids) {
        sqlx::query(
            "UPDATE modules SET step_number = $3
             WHERE id = $1 AND classroom_id = $2 AND step_number <> $3",
        )
        .bind(id)
        .bind(classroom_id)
        .bind(step)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
