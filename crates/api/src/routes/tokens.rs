//! Route definitions for the `/tokens` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::tokens;
use crate::state::AppState;

/// Routes mounted at `/tokens`.
///
/// ```text
/// GET  /  -> get_tokens
/// PUT  /  -> set_tokens
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(tokens::get_tokens).put(tokens::set_tokens))
}
