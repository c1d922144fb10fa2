//! Handlers for the `/profile` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use learnspace_core::catalog::ToolId;
use learnspace_core::error::CoreError;
use learnspace_core::profile::{parse_interests, FavoriteChange, Favorites, JobCategory};
use learnspace_db::models::profile::{CreateProfile, UpdateProfile, UserProfile};
use learnspace_db::repositories::ProfileRepo;
use learnspace_events::{ChangeEvent, ChangeTopic};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /profile`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, max = 80))]
    pub display_name: String,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub job_category: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

/// Request body for `PUT /profile`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 80))]
    pub display_name: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub job_category: Option<String>,
    pub interests: Option<Vec<String>>,
}

/// Request body for `PUT /profile/favorites`.
#[derive(Debug, Deserialize)]
pub struct SetFavoritesRequest {
    pub favorites: Vec<String>,
}

/// Request body for `POST /profile/favorites/toggle`.
#[derive(Debug, Deserialize)]
pub struct ToggleFavoriteRequest {
    pub tool_id: String,
}

/// Response for `POST /profile/favorites/toggle`.
#[derive(Debug, Serialize)]
pub struct ToggleFavoriteResponse {
    pub change: FavoriteChange,
    pub profile: UserProfile,
}

/// Request body for `PUT /profile/subscription`.
#[derive(Debug, Deserialize)]
pub struct SubscriptionRequest {
    pub is_paid: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/profile
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    let profile = find_profile(&state, &auth).await?;
    Ok(Json(DataResponse { data: profile }))
}

/// POST /api/v1/profile
///
/// Insert the caller's profile with empty favorites and unpaid status.
/// Returns 409 if one already exists.
pub async fn create_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateProfileRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UserProfile>>)> {
    input.validate()?;

    let create = CreateProfile {
        display_name: input.display_name.trim().to_string(),
        phone: input.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
        job_category: normalize_job_category(input.job_category.as_deref())?,
        interests: normalize_interests(&input.interests)?,
    };
    let profile = ProfileRepo::create(&state.pool, auth.user_id, &create).await?;

    state
        .change_bus
        .publish(ChangeEvent::created(ChangeTopic::Profile, auth.user_id).with_entity(profile.id));
    Ok((StatusCode::CREATED, Json(DataResponse { data: profile })))
}

/// PUT /api/v1/profile
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    input.validate()?;

    let update = UpdateProfile {
        display_name: input.display_name.map(|n| n.trim().to_string()),
        phone: input.phone.map(|p| p.trim().to_string()),
        job_category: normalize_job_category(input.job_category.as_deref())?,
        interests: input
            .interests
            .as_deref()
            .map(normalize_interests)
            .transpose()?,
    };
    let profile = ProfileRepo::update(&state.pool, auth.user_id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("Profile", auth.user_id))?;

    publish_profile_updated(&state, &auth, &profile);
    Ok(Json(DataResponse { data: profile }))
}

/// PUT /api/v1/profile/favorites
///
/// Overwrite the favorites set. Every id must exist in the tool catalog.
pub async fn set_favorites(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<SetFavoritesRequest>,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    let mut favorites = Favorites::new();
    for raw in &input.favorites {
        let id = ToolId::parse(raw)?;
        if !favorites.contains(&id) {
            favorites.toggle(id);
        }
    }

    let profile = ProfileRepo::set_favorites(&state.pool, auth.user_id, &favorites.to_stored())
        .await?
        .ok_or_else(|| AppError::not_found("Profile", auth.user_id))?;

    publish_profile_updated(&state, &auth, &profile);
    Ok(Json(DataResponse { data: profile }))
}

/// POST /api/v1/profile/favorites/toggle
///
/// Add the tool if absent, remove it if present. Read-modify-write with
/// last-writer-wins semantics.
pub async fn toggle_favorite(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ToggleFavoriteRequest>,
) -> AppResult<Json<DataResponse<ToggleFavoriteResponse>>> {
    let tool_id = ToolId::parse(&input.tool_id)?;
    let current = find_profile(&state, &auth).await?;

    let mut favorites = Favorites::from_stored(&current.favorites);
    let change = favorites.toggle(tool_id);

    let profile = ProfileRepo::set_favorites(&state.pool, auth.user_id, &favorites.to_stored())
        .await?
        .ok_or_else(|| AppError::not_found("Profile", auth.user_id))?;

    tracing::debug!(user_id = auth.user_id, tool = %input.tool_id, ?change, "Favorite toggled");
    publish_profile_updated(&state, &auth, &profile);
    Ok(Json(DataResponse {
        data: ToggleFavoriteResponse { change, profile },
    }))
}

/// PUT /api/v1/profile/subscription
pub async fn update_subscription(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<SubscriptionRequest>,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    let profile = ProfileRepo::set_paid(&state.pool, auth.user_id, input.is_paid)
        .await?
        .ok_or_else(|| AppError::not_found("Profile", auth.user_id))?;

    tracing::info!(user_id = auth.user_id, is_paid = input.is_paid, "Subscription updated");
    publish_profile_updated(&state, &auth, &profile);
    Ok(Json(DataResponse { data: profile }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_profile(state: &AppState, auth: &AuthUser) -> AppResult<UserProfile> {
    ProfileRepo::find_by_user(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Profile", auth.user_id))
}

fn publish_profile_updated(state: &AppState, auth: &AuthUser, profile: &UserProfile) {
    state
        .change_bus
        .publish(ChangeEvent::updated(ChangeTopic::Profile, auth.user_id).with_entity(profile.id));
}

fn normalize_job_category(raw: Option<&str>) -> Result<Option<String>, CoreError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<JobCategory>().map(|c| c.as_str().to_string()))
        .transpose()
}

fn normalize_interests(raw: &[String]) -> Result<Vec<String>, CoreError> {
    Ok(parse_interests(raw)?
        .into_iter()
        .map(|t| t.as_str().to_string())
        .collect())
}
