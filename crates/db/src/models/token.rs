//! Token balance model.

use learnspace_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// A row from the `user_tokens` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TokenBalance {
    pub user_id: DbId,
    pub balance: i32,
    pub updated_at: Timestamp,
}
