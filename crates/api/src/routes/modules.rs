//! Route definitions for the `/modules` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::modules;
use crate::state::AppState;

/// Routes mounted at `/modules`.
///
/// ```text
/// GET    /{id}                   -> get_module
/// PUT    /{id}                   -> update_module
/// DELETE /{id}                   -> delete_module
/// POST   /{id}/progress/toggle   -> toggle_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(modules::get_module)
                .put(modules::update_module)
                .delete(modules::delete_module),
        )
        .route("/{id}/progress/toggle", post(modules::toggle_progress))
}
