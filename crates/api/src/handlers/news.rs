//! Handlers for channel subscriptions and the video digest feed.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use learnspace_core::types::DbId;
use learnspace_db::models::youtube::{CreateYoutubeChannel, YoutubeChannel, YoutubeDigest};
use learnspace_db::repositories::{ChannelRepo, DigestRepo};
use learnspace_events::{ChangeEvent, ChangeTopic};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::query::DigestParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /channels`.
#[derive(Debug, Deserialize, Validate)]
pub struct AddChannelRequest {
    #[validate(length(min = 1, max = 64))]
    pub channel_id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
}

/// GET /api/v1/digests?channel_id=&limit=
pub async fn list_digests(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<DigestParams>,
) -> AppResult<Json<DataResponse<Vec<YoutubeDigest>>>> {
    let digests =
        DigestRepo::list(&state.pool, params.channel(), params.clamped_limit()).await?;
    Ok(Json(DataResponse { data: digests }))
}

/// GET /api/v1/digests/{video_id}
pub async fn get_digest(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(video_id): Path<String>,
) -> AppResult<Json<DataResponse<YoutubeDigest>>> {
    let digest = DigestRepo::find_by_video_id(&state.pool, &video_id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)?;
    Ok(Json(DataResponse { data: digest }))
}

/// GET /api/v1/channels
pub async fn list_channels(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<YoutubeChannel>>>> {
    let channels = ChannelRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: channels }))
}

/// POST /api/v1/channels
pub async fn add_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<AddChannelRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<YoutubeChannel>>)> {
    input.validate()?;

    let create = CreateYoutubeChannel {
        channel_id: input.channel_id.trim().to_string(),
        title: input.title.trim().to_string(),
    };
    let channel = ChannelRepo::add(&state.pool, auth.user_id, &create).await?;

    state.change_bus.publish(
        ChangeEvent::created(ChangeTopic::Channels, auth.user_id).with_entity(channel.id),
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: channel })))
}

/// DELETE /api/v1/channels/{id}
pub async fn remove_channel(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ChannelRepo::remove(&state.pool, auth.user_id, id).await? {
        return Err(AppError::not_found("Channel", id));
    }
    state
        .change_bus
        .publish(ChangeEvent::deleted(ChangeTopic::Channels, auth.user_id).with_entity(id));
    Ok(StatusCode::NO_CONTENT)
}
