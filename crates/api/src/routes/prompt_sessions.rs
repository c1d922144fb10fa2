//! Route definitions for the `/prompt-sessions` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::prompt_sessions;
use crate::state::AppState;

/// Routes mounted at `/prompt-sessions`.
///
/// ```text
/// GET    /                -> list_sessions
/// POST   /                -> create_session
/// GET    /{id}            -> get_session
/// PUT    /{id}            -> update_session
/// DELETE /{id}            -> delete_session
/// GET    /{id}/messages   -> list_messages
/// POST   /{id}/messages   -> append_message
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(prompt_sessions::list_sessions).post(prompt_sessions::create_session),
        )
        .route(
            "/{id}",
            get(prompt_sessions::get_session)
                .put(prompt_sessions::update_session)
                .delete(prompt_sessions::delete_session),
        )
        .route(
            "/{id}/messages",
            get(prompt_sessions::list_messages).post(prompt_sessions::append_message),
        )
}
