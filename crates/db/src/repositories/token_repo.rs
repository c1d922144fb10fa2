//! Repository for the `user_tokens` table.

use learnspace_core::types::DbId;
use sqlx::PgPool;

use crate::models::token::TokenBalance;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "user_id, balance, updated_at";

/// Provides data access for token balances.
///
/// Balances are written with an absolute set; there is no atomic
/// increment, so concurrent writers resolve as last-writer-wins.
pub struct TokenRepo;

impl TokenRepo {
    /// Insert the balance row for a new identity.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        balance: i32,
    ) -> Result<TokenBalance, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_tokens (user_id, balance) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TokenBalance>(&query)
            .bind(user_id)
            .bind(balance)
            .fetch_one(pool)
            .await
    }

    /// Return the balance row for `user_id`, creating it with `initial`
    /// tokens if it does not exist yet.
    pub async fn ensure(
        pool: &PgPool,
        user_id: DbId,
        initial: i32,
    ) -> Result<TokenBalance, sqlx::Error> {
        sqlx::query(
            "INSERT INTO user_tokens (user_id, balance) VALUES ($1, $2)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(initial)
        .execute(pool)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM user_tokens WHERE user_id = $1");
        sqlx::query_as::<_, TokenBalance>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Find the balance for `user_id`.
    pub async fn get(pool: &PgPool, user_id: DbId) -> Result<Option<TokenBalance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_tokens WHERE user_id = $1");
        sqlx::query_as::<_, TokenBalance>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the balance. Returns `None` if no row exists for the user.
    pub async fn set_balance(
        pool: &PgPool,
        user_id: DbId,
        balance: i32,
    ) -> Result<Option<TokenBalance>, sqlx::Error> {
        let query = format!(
            "UPDATE user_tokens SET balance = $2 WHERE user_id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TokenBalance>(&query)
            .bind(user_id)
            .bind(balance)
            .fetch_optional(pool)
            .await
    }
}
