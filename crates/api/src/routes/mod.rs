pub mod auth;
pub mod billing;
pub mod classrooms;
pub mod functions;
pub mod health;
pub mod modules;
pub mod news;
pub mod profile;
pub mod prompt_sessions;
pub mod tokens;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /realtime?token=                                 WebSocket change feed
///
/// /auth/signup                                     create identity (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/session                                    current identity
///
/// /profile                                         get, insert, update
/// /profile/favorites                               replace favorites (PUT)
/// /profile/favorites/toggle                        toggle one tool (POST)
/// /profile/subscription                            paid flag (PUT)
///
/// /tokens                                          get, set (absolute)
///
/// /classrooms                                      list, create
/// /classrooms/{id}                                 get, update, delete
/// /classrooms/{id}/modules                         list, append
/// /classrooms/{id}/modules/reorder                 reorder (PUT)
/// /classrooms/{id}/progress                        progress rows
///
/// /modules/{id}                                    get, update, delete
/// /modules/{id}/progress/toggle                    toggle completion (POST)
///
/// /prompt-sessions                                 list, create
/// /prompt-sessions/{id}                            get, update, delete
/// /prompt-sessions/{id}/messages                   transcript, append
///
/// /digests                                         news feed (?channel_id=&limit=)
/// /digests/{video_id}                              one digest
/// /channels                                        list, subscribe
/// /channels/{id}                                   unsubscribe (DELETE)
///
/// /functions/chat                                  assistant turn (POST)
/// /functions/generate-curriculum                   curriculum plan (POST)
///
/// /billing/checkout                                mocked checkout (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Realtime change feed.
        .route("/realtime", get(ws::realtime_handler))
        .nest("/auth", auth::router())
        .nest("/profile", profile::router())
        .nest("/tokens", tokens::router())
        // Classrooms plus classroom-scoped module routes.
        .nest("/classrooms", classrooms::router())
        .nest("/modules", modules::router())
        .nest("/prompt-sessions", prompt_sessions::router())
        .merge(news::router())
        .nest("/functions", functions::router())
        .nest("/billing", billing::router())
}
