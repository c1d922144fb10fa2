//! Handlers for modules and per-module progress.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use learnspace_core::curriculum::validate_module_title;
use learnspace_core::types::DbId;
use learnspace_db::models::module::{CreateModule, Module, ReorderModules, UpdateModule};
use learnspace_db::models::progress::ModuleProgress;
use learnspace_db::repositories::{ClassroomRepo, ModuleRepo, ProgressRepo, ReorderOutcome};
use learnspace_events::{ChangeEvent, ChangeTopic};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/classrooms/{id}/modules
///
/// Ordered by step number.
pub async fn list_modules(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(classroom_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Module>>>> {
    ensure_classroom(&state, &auth, classroom_id).await?;
    let modules = ModuleRepo::list_for_classroom(&state.pool, auth.user_id, classroom_id).await?;
    Ok(Json(DataResponse { data: modules }))
}

/// POST /api/v1/classrooms/{id}/modules
///
/// Appends the module after the classroom's last step.
pub async fn create_module(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(classroom_id): Path<DbId>,
    Json(input): Json<CreateModule>,
) -> AppResult<(StatusCode, Json<DataResponse<Module>>)> {
    validate_module_title(&input.title)?;

    let module = ModuleRepo::create(&state.pool, auth.user_id, classroom_id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Classroom", classroom_id))?;

    publish_module_change(&state, &auth, ChangeEvent::created, &module);
    Ok((StatusCode::CREATED, Json(DataResponse { data: module })))
}

/// PUT /api/v1/classrooms/{id}/modules/reorder
///
/// `module_ids` must list every module of the classroom exactly once.
pub async fn reorder_modules(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(classroom_id): Path<DbId>,
    Json(input): Json<ReorderModules>,
) -> AppResult<Json<DataResponse<Vec<Module>>>> {
    let modules =
        match ModuleRepo::reorder(&state.pool, auth.user_id, classroom_id, &input.module_ids)
            .await?
        {
            ReorderOutcome::Reordered(modules) => modules,
            ReorderOutcome::Rejected(err) => return Err(err.into()),
            ReorderOutcome::ClassroomNotFound => {
                return Err(AppError::not_found("Classroom", classroom_id))
            }
        };

    tracing::debug!(user_id = auth.user_id, classroom_id, count = modules.len(), "Modules reordered");
    state.change_bus.publish(
        ChangeEvent::updated(ChangeTopic::Modules, auth.user_id).with_parent(classroom_id),
    );
    state.change_bus.publish(
        ChangeEvent::updated(ChangeTopic::Classrooms, auth.user_id).with_entity(classroom_id),
    );
    Ok(Json(DataResponse { data: modules }))
}

/// GET /api/v1/modules/{id}
pub async fn get_module(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Module>>> {
    let module = ModuleRepo::find_by_id(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Module", id))?;
    Ok(Json(DataResponse { data: module }))
}

/// PUT /api/v1/modules/{id}
pub async fn update_module(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateModule>,
) -> AppResult<Json<DataResponse<Module>>> {
    if let Some(title) = &input.title {
        validate_module_title(title)?;
    }

    let module = ModuleRepo::update(&state.pool, auth.user_id, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("Module", id))?;

    publish_module_change(&state, &auth, ChangeEvent::updated, &module);
    Ok(Json(DataResponse { data: module }))
}

/// DELETE /api/v1/modules/{id}
///
/// The remaining modules are renumbered to close the gap.
pub async fn delete_module(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let classroom_id = ModuleRepo::delete(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Module", id))?;

    state.change_bus.publish(
        ChangeEvent::deleted(ChangeTopic::Modules, auth.user_id)
            .with_entity(id)
            .with_parent(classroom_id),
    );
    state.change_bus.publish(
        ChangeEvent::updated(ChangeTopic::Classrooms, auth.user_id).with_entity(classroom_id),
    );
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/modules/{id}/progress/toggle
pub async fn toggle_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<ModuleProgress>>> {
    let module = ModuleRepo::find_by_id(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Module", id))?;

    let progress = ProgressRepo::toggle(&state.pool, auth.user_id, module.id).await?;

    state.change_bus.publish(
        ChangeEvent::updated(ChangeTopic::ModuleProgress, auth.user_id)
            .with_entity(module.id)
            .with_parent(module.classroom_id),
    );
    Ok(Json(DataResponse { data: progress }))
}

/// GET /api/v1/classrooms/{id}/progress
pub async fn list_progress(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(classroom_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<ModuleProgress>>>> {
    ensure_classroom(&state, &auth, classroom_id).await?;
    let rows = ProgressRepo::list_for_classroom(&state.pool, auth.user_id, classroom_id).await?;
    Ok(Json(DataResponse { data: rows }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn ensure_classroom(state: &AppState, auth: &AuthUser, classroom_id: DbId) -> AppResult<()> {
    ClassroomRepo::find_for_user(&state.pool, auth.user_id, classroom_id)
        .await?
        .ok_or_else(|| AppError::not_found("Classroom", classroom_id))?;
    Ok(())
}

/// Publish a module change plus the parent classroom update (its module
/// count is derived from the module set).
fn publish_module_change(
    state: &AppState,
    auth: &AuthUser,
    make: fn(ChangeTopic, DbId) -> ChangeEvent,
    module: &Module,
) {
    state.change_bus.publish(
        make(ChangeTopic::Modules, auth.user_id)
            .with_entity(module.id)
            .with_parent(module.classroom_id),
    );
    state.change_bus.publish(
        ChangeEvent::updated(ChangeTopic::Classrooms, auth.user_id)
            .with_entity(module.classroom_id),
    );
}
