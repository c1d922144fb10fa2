//! Profile model and DTOs.

use learnspace_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// A row from the `user_profiles` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UserProfile {
    pub id: DbId,
    pub user_id: DbId,
    pub display_name: String,
    pub phone: Option<String>,
    pub job_category: Option<String>,
    pub interests: Vec<String>,
    /// Catalog tool ids.
    pub favorites: Vec<String>,
    pub is_paid: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a profile. Favorites start empty and the account unpaid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProfile {
    pub display_name: String,
    pub phone: Option<String>,
    pub job_category: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

/// DTO for updating profile details. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub display_name: Option<String>,
    pub phone: Option<String>,
    pub job_category: Option<String>,
    pub interests: Option<Vec<String>>,
}
