//! Repositories for `youtube_channels` and `youtube_digests`.

use learnspace_core::types::DbId;
use sqlx::PgPool;

use crate::models::youtube::{CreateYoutubeChannel, YoutubeChannel, YoutubeDigest};

const CHANNEL_COLUMNS: &str = "id, user_id, channel_id, title, created_at";

const DIGEST_COLUMNS: &str = "id, channel_id, video_id, title, thumbnail_url, published_at, \
                               summary, article, language, created_at";

/// Provides data access for followed channels.
pub struct ChannelRepo;

impl ChannelRepo {
    /// Channels followed by `user_id`, in the order they were added.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<YoutubeChannel>, sqlx::Error> {
        let query = format!(
            "SELECT {CHANNEL_COLUMNS} FROM youtube_channels
             WHERE user_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, YoutubeChannel>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Follow a channel. Fails with `uq_youtube_channels_user_channel` on duplicates.
    pub async fn add(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateYoutubeChannel,
    ) -> Result<YoutubeChannel, sqlx::Error> {
        let query = format!(
            "INSERT INTO youtube_channels (user_id, channel_id, title)
             VALUES ($1, $2, $3)
             RETURNING {CHANNEL_COLUMNS}"
        );
        sqlx::query_as::<_, YoutubeChannel>(&query)
            .bind(user_id)
            .bind(input.channel_id.trim())
            .bind(input.title.trim())
            .fetch_one(pool)
            .await
    }

    /// Unfollow a channel. Returns `true` if a row was removed.
    pub async fn remove(pool: &PgPool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM youtube_channels WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Read access to video digests. Rows are written by the ingestion job.
pub struct DigestRepo;

impl DigestRepo {
    /// Digests newest first, optionally restricted to one channel.
    pub async fn list(
        pool: &PgPool,
        channel_id: Option<&str>,
        limit: i64,
    ) -> Result<Vec<YoutubeDigest>, sqlx::Error> {
        let query = format!(
            "SELECT {DIGEST_COLUMNS} FROM youtube_digests
             WHERE ($1::TEXT IS NULL OR channel_id = $1)
             ORDER BY published_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, YoutubeDigest>(&query)
            .bind(channel_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Find a digest by its video id.
    pub async fn find_by_video_id(
        pool: &PgPool,
        video_id: &str,
    ) -> Result<Option<YoutubeDigest>, sqlx::Error> {
        let query = format!("SELECT {DIGEST_COLUMNS} FROM youtube_digests WHERE video_id = $1");
        sqlx::query_as::<_, YoutubeDigest>(&query)
            .bind(video_id)
            .fetch_optional(pool)
            .await
    }
}
