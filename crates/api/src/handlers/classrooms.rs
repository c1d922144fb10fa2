//! Handlers for the `/classrooms` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use learnspace_core::curriculum::{
    validate_classroom_name, validate_color, DEFAULT_CLASSROOM_COLOR,
};
use learnspace_core::types::DbId;
use learnspace_db::models::classroom::{Classroom, CreateClassroom, UpdateClassroom};
use learnspace_db::repositories::ClassroomRepo;
use learnspace_events::{ChangeEvent, ChangeTopic};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/classrooms
///
/// Newest first, each with its module count.
pub async fn list_classrooms(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Classroom>>>> {
    let classrooms = ClassroomRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: classrooms }))
}

/// POST /api/v1/classrooms
pub async fn create_classroom(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateClassroom>,
) -> AppResult<(StatusCode, Json<DataResponse<Classroom>>)> {
    validate_classroom_name(&input.name)?;
    let color = input
        .color
        .as_deref()
        .unwrap_or(DEFAULT_CLASSROOM_COLOR)
        .to_string();
    validate_color(&color)?;

    let classroom = ClassroomRepo::create(&state.pool, auth.user_id, &input, &color).await?;
    tracing::info!(user_id = auth.user_id, classroom_id = classroom.id, "Classroom created");

    state.change_bus.publish(
        ChangeEvent::created(ChangeTopic::Classrooms, auth.user_id).with_entity(classroom.id),
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: classroom })))
}

/// GET /api/v1/classrooms/{id}
pub async fn get_classroom(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Classroom>>> {
    let classroom = ClassroomRepo::find_for_user(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Classroom", id))?;
    Ok(Json(DataResponse { data: classroom }))
}

/// PUT /api/v1/classrooms/{id}
pub async fn update_classroom(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateClassroom>,
) -> AppResult<Json<DataResponse<Classroom>>> {
    if let Some(name) = &input.name {
        validate_classroom_name(name)?;
    }
    if let Some(color) = &input.color {
        validate_color(color)?;
    }

    let classroom = ClassroomRepo::update(&state.pool, auth.user_id, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Classroom", id))?;

    state
        .change_bus
        .publish(ChangeEvent::updated(ChangeTopic::Classrooms, auth.user_id).with_entity(id));
    Ok(Json(DataResponse { data: classroom }))
}

/// DELETE /api/v1/classrooms/{id}
///
/// Removes the classroom together with its modules and their progress.
pub async fn delete_classroom(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ClassroomRepo::delete(&state.pool, auth.user_id, id).await? {
        return Err(AppError::not_found("Classroom", id));
    }
    tracing::info!(user_id = auth.user_id, classroom_id = id, "Classroom deleted");

    state
        .change_bus
        .publish(ChangeEvent::deleted(ChangeTopic::Classrooms, auth.user_id).with_entity(id));
    Ok(StatusCode::NO_CONTENT)
}
