//! Route definitions for the generative-AI edge functions.

use axum::routing::post;
use axum::Router;

use crate::handlers::functions;
use crate::state::AppState;

/// Routes mounted at `/functions`.
///
/// ```text
/// POST /chat                  -> chat
/// POST /generate-curriculum   -> generate_curriculum
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(functions::chat))
        .route("/generate-curriculum", post(functions::generate_curriculum))
}
