//! YouTube channel subscriptions and video digests.

use learnspace_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;

/// A row from the `youtube_channels` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct YoutubeChannel {
    pub id: DbId,
    pub user_id: DbId,
    pub channel_id: String,
    pub title: String,
    pub created_at: Timestamp,
}

/// DTO for following a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateYoutubeChannel {
    pub channel_id: String,
    pub title: String,
}

/// A row from the `youtube_digests` table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct YoutubeDigest {
    pub id: DbId,
    pub channel_id: String,
    pub video_id: String,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub published_at: Timestamp,
    pub summary: String,
    /// Long-form article body, when generated.
    pub article: Option<String>,
    /// Detected language of the video.
    pub language: Option<String>,
    pub created_at: Timestamp,
}
