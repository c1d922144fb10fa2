//! Classroom model and DTOs.

use learnspace_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// A row from the `classrooms` table, plus the derived module count.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Classroom {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    /// Free-text syllabus.
    pub description: String,
    /// `#RRGGBB`.
    pub color: String,
    /// Computed by the query, never stored.
    pub module_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a classroom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClassroom {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// DTO for updating a classroom. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateClassroom {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}
