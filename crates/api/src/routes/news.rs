//! Route definitions for the news feed: `/digests` and `/channels`.

use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::news;
use crate::state::AppState;

/// Routes merged at the API root.
///
/// ```text
/// GET    /digests              -> list_digests
/// GET    /digests/{video_id}   -> get_digest
/// GET    /channels             -> list_channels
/// POST   /channels             -> add_channel
/// DELETE /channels/{id}        -> remove_channel
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/digests", get(news::list_digests))
        .route("/digests/{video_id}", get(news::get_digest))
        .route("/channels", get(news::list_channels).post(news::add_channel))
        .route("/channels/{id}", delete(news::remove_channel))
}
