//! Handlers for prompt-assistant sessions and their transcripts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use learnspace_core::chat::{
    learning_space_action_index, session_title_from, validate_message_content, Sender,
    DEFAULT_SESSION_TITLE,
};
use learnspace_core::genai_parse::normalize_tags;
use learnspace_core::types::DbId;
use learnspace_db::models::prompt::{
    CreatePromptMessage, CreatePromptSession, PromptMessage, PromptSession, UpdatePromptSession,
};
use learnspace_db::repositories::{PromptMessageRepo, PromptSessionRepo};
use learnspace_events::{ChangeEvent, ChangeTopic};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// A session transcript plus where the "Create Learning Space" action sits.
#[derive(Debug, Serialize)]
pub struct Transcript {
    pub messages: Vec<PromptMessage>,
    pub learning_space_action_index: Option<usize>,
}

impl Transcript {
    pub fn new(messages: Vec<PromptMessage>) -> Self {
        let index = learning_space_action_index(messages.iter().map(|m| {
            (
                m.sender.parse::<Sender>().unwrap_or(Sender::User),
                m.suggests_learning_space,
            )
        }));
        Self {
            messages,
            learning_space_action_index: index,
        }
    }
}

/// GET /api/v1/prompt-sessions
pub async fn list_sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<PromptSession>>>> {
    let sessions = PromptSessionRepo::list_for_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: sessions }))
}

/// POST /api/v1/prompt-sessions
pub async fn create_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(mut input): Json<CreatePromptSession>,
) -> AppResult<(StatusCode, Json<DataResponse<PromptSession>>)> {
    let title = match input.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => DEFAULT_SESSION_TITLE.to_string(),
    };
    input.tags = normalize_tags(&input.tags);

    let session = PromptSessionRepo::create(&state.pool, auth.user_id, &title, &input).await?;
    state.change_bus.publish(
        ChangeEvent::created(ChangeTopic::PromptSessions, auth.user_id).with_entity(session.id),
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// GET /api/v1/prompt-sessions/{id}
pub async fn get_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PromptSession>>> {
    let session = find_session(&state, &auth, id).await?;
    Ok(Json(DataResponse { data: session }))
}

/// PUT /api/v1/prompt-sessions/{id}
pub async fn update_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(mut input): Json<UpdatePromptSession>,
) -> AppResult<Json<DataResponse<PromptSession>>> {
    if let Some(title) = &input.title {
        if title.trim().is_empty() {
            return Err(AppError::BadRequest("title must not be empty".into()));
        }
    }
    input.tags = input.tags.as_deref().map(normalize_tags);

    let session = PromptSessionRepo::update(&state.pool, auth.user_id, id, &input)
        .await?
        .ok_or_else(|| AppError::not_found("PromptSession", id))?;

    state.change_bus.publish(
        ChangeEvent::updated(ChangeTopic::PromptSessions, auth.user_id).with_entity(id),
    );
    Ok(Json(DataResponse { data: session }))
}

/// DELETE /api/v1/prompt-sessions/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !PromptSessionRepo::delete(&state.pool, auth.user_id, id).await? {
        return Err(AppError::not_found("PromptSession", id));
    }
    state.change_bus.publish(
        ChangeEvent::deleted(ChangeTopic::PromptSessions, auth.user_id).with_entity(id),
    );
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/prompt-sessions/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Transcript>>> {
    find_session(&state, &auth, id).await?;
    let messages = PromptMessageRepo::list_for_session(&state.pool, auth.user_id, id).await?;
    Ok(Json(DataResponse {
        data: Transcript::new(messages),
    }))
}

/// POST /api/v1/prompt-sessions/{id}/messages
///
/// Appends one message without invoking the assistant.
pub async fn append_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<CreatePromptMessage>,
) -> AppResult<(StatusCode, Json<DataResponse<PromptMessage>>)> {
    let sender: Sender = input.sender.parse()?;
    validate_message_content(&input.content)?;
    if sender == Sender::User && input.suggests_learning_space {
        return Err(AppError::BadRequest(
            "only ai messages can suggest a learning space".into(),
        ));
    }

    let session = find_session(&state, &auth, id).await?;
    let message = append_and_touch(&state, &auth, &session, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: message })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) async fn find_session(
    state: &AppState,
    auth: &AuthUser,
    id: DbId,
) -> AppResult<PromptSession> {
    PromptSessionRepo::find(&state.pool, auth.user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("PromptSession", id))
}

/// Persist a message, retitle a still-default session from its first user
/// message, bump the session to the top of the list and publish both changes.
pub(crate) async fn append_and_touch(
    state: &AppState,
    auth: &AuthUser,
    session: &PromptSession,
    input: &CreatePromptMessage,
) -> AppResult<PromptMessage> {
    let message = PromptMessageRepo::append(&state.pool, session.id, input).await?;

    if session.title == DEFAULT_SESSION_TITLE && input.sender == Sender::User.as_str() {
        let retitle = UpdatePromptSession {
            title: Some(session_title_from(&input.content)),
            ..Default::default()
        };
        PromptSessionRepo::update(&state.pool, auth.user_id, session.id, &retitle).await?;
    } else {
        PromptSessionRepo::touch(&state.pool, auth.user_id, session.id).await?;
    }

    state.change_bus.publish(
        ChangeEvent::created(ChangeTopic::PromptMessages, auth.user_id)
            .with_entity(message.id)
            .with_parent(session.id),
    );
    state.change_bus.publish(
        ChangeEvent::updated(ChangeTopic::PromptSessions, auth.user_id).with_entity(session.id),
    );
    Ok(message)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn message(id: DbId, sender: &str, suggests: bool) -> PromptMessage {
        PromptMessage {
            id,
            session_id: 1,
            sender: sender.into(),
            content: "…".into(),
            suggests_learning_space: suggests,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn transcript_marks_latest_suggestion() {
        let transcript = Transcript::new(vec![
            message(1, "user", false),
            message(2, "ai", true),
            message(3, "user", false),
            message(4, "ai", false),
        ]);
        assert_eq!(transcript.learning_space_action_index, Some(1));
    }

    #[test]
    fn transcript_without_suggestion() {
        let transcript = Transcript::new(vec![message(1, "user", false)]);
        assert_eq!(transcript.learning_space_action_index, None);
    }
}
