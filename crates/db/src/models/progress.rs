//! Module progress model.

use learnspace_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// A row from the `module_progress` table. Created lazily on first toggle.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ModuleProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub module_id: DbId,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
