//! Route definitions for the `/classrooms` resource.
//!
//! Also mounts the classroom-scoped module and progress endpoints.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{classrooms, modules};
use crate::state::AppState;

/// Routes mounted at `/classrooms`.
///
/// ```text
/// GET    /                       -> list_classrooms
/// POST   /                       -> create_classroom
/// GET    /{id}                   -> get_classroom
/// PUT    /{id}                   -> update_classroom
/// DELETE /{id}                   -> delete_classroom
///
/// GET    /{id}/modules           -> list_modules
/// POST   /{id}/modules           -> create_module
/// PUT    /{id}/modules/reorder   -> reorder_modules
/// GET    /{id}/progress          -> list_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(classrooms::list_classrooms).post(classrooms::create_classroom),
        )
        .route(
            "/{id}",
            get(classrooms::get_classroom)
                .put(classrooms::update_classroom)
                .delete(classrooms::delete_classroom),
        )
        .route(
            "/{id}/modules",
            get(modules::list_modules).post(modules::create_module),
        )
        .route("/{id}/modules/reorder", put(modules::reorder_modules))
        .route("/{id}/progress", get(modules::list_progress))
}
