//! Module model and DTOs.

use learnspace_core::curriculum::{ContentBlock, VideoDigestRef};
use learnspace_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use ts_rs::TS;

/// A row from the `modules` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Module {
    pub id: DbId,
    pub classroom_id: DbId,
    pub title: String,
    pub description: String,
    /// Position inside the classroom; always `1..=N`.
    pub step_number: i32,
    #[ts(type = "Array<Record<string, unknown>>")]
    pub content: Json<Vec<ContentBlock>>,
    #[ts(type = "Array<Record<string, unknown>>")]
    pub video_digests: Json<Vec<VideoDigestRef>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a module. New modules are appended after the last step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateModule {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub video_digests: Vec<VideoDigestRef>,
}

/// DTO for updating a module. Step numbers change only through reorder.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateModule {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<Vec<ContentBlock>>,
    pub video_digests: Option<Vec<VideoDigestRef>>,
}

/// DTO for reordering all modules of a classroom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReorderModules {
    /// Every module id of the classroom, in the new order.
    pub module_ids: Vec<DbId>,
}
