//! Route definitions for the `/profile` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// Routes mounted at `/profile`.
///
/// ```text
/// GET    /                   -> get_profile
/// POST   /                   -> create_profile
/// PUT    /                   -> update_profile
/// PUT    /favorites          -> set_favorites
/// POST   /favorites/toggle   -> toggle_favorite
/// PUT    /subscription       -> update_subscription
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(profile::get_profile)
                .post(profile::create_profile)
                .put(profile::update_profile),
        )
        .route("/favorites", put(profile::set_favorites))
        .route("/favorites/toggle", post(profile::toggle_favorite))
        .route("/subscription", put(profile::update_subscription))
}
