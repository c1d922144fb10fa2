//! Repository for the `user_profiles` table.

use learnspace_core::types::DbId;
use sqlx::PgPool;

use crate::models::profile::{CreateProfile, UpdateProfile, UserProfile};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, display_name, phone, job_category, interests, \
                        favorites, is_paid, created_at, updated_at";

/// Provides data access for profiles (one per identity).
pub struct ProfileRepo;

impl ProfileRepo {
    /// Insert the profile for `user_id` with empty favorites and unpaid status.
    ///
    /// Fails with a `uq_user_profiles_user_id` violation if one already exists.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateProfile,
    ) -> Result<UserProfile, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_profiles (user_id, display_name, phone, job_category, interests)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .bind(&input.display_name)
            .bind(&input.phone)
            .bind(&input.job_category)
            .bind(&input.interests)
            .fetch_one(pool)
            .await
    }

    /// Find the profile belonging to `user_id`.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_profiles WHERE user_id = $1");
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Update profile details. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        user_id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE user_profiles SET
                display_name = COALESCE($2, display_name),
                phone = COALESCE($3, phone),
                job_category = COALESCE($4, job_category),
                interests = COALESCE($5, interests)
             WHERE user_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .bind(&input.display_name)
            .bind(&input.phone)
            .bind(&input.job_category)
            .bind(&input.interests)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the full favorites set. Last writer wins.
    pub async fn set_favorites(
        pool: &PgPool,
        user_id: DbId,
        favorites: &[String],
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE user_profiles SET favorites = $2 WHERE user_id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .bind(favorites)
            .fetch_optional(pool)
            .await
    }

    /// Set the subscription (paid) flag.
    pub async fn set_paid(
        pool: &PgPool,
        user_id: DbId,
        is_paid: bool,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE user_profiles SET is_paid = $2 WHERE user_id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(user_id)
            .bind(is_paid)
            .fetch_optional(pool)
            .await
    }
}
