//! Generative-AI edge functions: the chat turn and curriculum generation.
//!
//! Both endpoints answer 200 even when the model output is unusable; the
//! `Parsed` envelope tells the caller whether the fallback was used.

use axum::extract::State;
use axum::Json;
use learnspace_core::chat::{validate_message_content, Sender};
use learnspace_core::curriculum::{
    clamp_chars, validate_classroom_name, validate_color, validate_module_title,
    DEFAULT_CLASSROOM_COLOR, MAX_CLASSROOM_NAME_LEN, MAX_MODULE_TITLE_LEN,
};
use learnspace_core::error::CoreError;
use learnspace_core::genai_parse::{ChatReply, CurriculumPlan, Parsed};
use learnspace_core::types::DbId;
use learnspace_db::models::classroom::{Classroom, CreateClassroom};
use learnspace_db::models::module::{CreateModule, Module};
use learnspace_db::models::prompt::{
    CreatePromptMessage, PromptMessage, PromptSession, UpdatePromptSession,
};
use learnspace_db::repositories::{ClassroomRepo, PromptMessageRepo, PromptSessionRepo};
use learnspace_events::{ChangeEvent, ChangeTopic};
use learnspace_genai::{ChatAssistant, ChatTurn, CurriculumGenerator, SkillLevel};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::prompt_sessions::{append_and_touch, find_session};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// Request body for `POST /functions/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: DbId,
    pub message: String,
}

/// Response for `POST /functions/chat`.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub user_message: PromptMessage,
    pub ai_message: PromptMessage,
    pub reply: Parsed<ChatReply>,
    pub session: PromptSession,
}

/// POST /api/v1/functions/chat
///
/// Persists the user message, asks the assistant, persists its reply and
/// folds `main_prompt`/`tags` into the session.
pub async fn chat(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<ChatRequest>,
) -> AppResult<Json<DataResponse<ChatResponse>>> {
    validate_message_content(&input.message)?;
    let session = find_session(&state, &auth, input.session_id).await?;

    let history: Vec<ChatTurn> =
        PromptMessageRepo::list_for_session(&state.pool, auth.user_id, session.id)
            .await?
            .into_iter()
            .filter_map(|m| {
                let sender = m.sender.parse::<Sender>().ok()?;
                Some(ChatTurn {
                    sender,
                    content: m.content,
                })
            })
            .collect();

    let user_message = append_and_touch(
        &state,
        &auth,
        &session,
        &CreatePromptMessage {
            sender: Sender::User.to_string(),
            content: input.message.clone(),
            suggests_learning_space: false,
        },
    )
    .await?;

    let reply = ChatAssistant::new(state.generator.clone())
        .reply(&history, &input.message)
        .await;
    let value = reply.value();

    let ai_message = PromptMessageRepo::append(
        &state.pool,
        session.id,
        &CreatePromptMessage {
            sender: Sender::Ai.to_string(),
            content: value.reply.clone(),
            suggests_learning_space: value.suggest_learning_space,
        },
    )
    .await?;
    state.change_bus.publish(
        ChangeEvent::created(ChangeTopic::PromptMessages, auth.user_id)
            .with_entity(ai_message.id)
            .with_parent(session.id),
    );

    let update = UpdatePromptSession {
        main_prompt: value.main_prompt.clone(),
        tags: (!value.tags.is_empty()).then(|| value.tags.clone()),
        ..Default::default()
    };
    let session = PromptSessionRepo::update(&state.pool, auth.user_id, session.id, &update)
        .await?
        .ok_or_else(|| AppError::not_found("PromptSession", session.id))?;
    state.change_bus.publish(
        ChangeEvent::updated(ChangeTopic::PromptSessions, auth.user_id).with_entity(session.id),
    );

    tracing::debug!(
        user_id = auth.user_id,
        session_id = session.id,
        structured = reply.is_structured(),
        "Chat turn completed"
    );

    Ok(Json(DataResponse {
        data: ChatResponse {
            user_message,
            ai_message,
            reply,
            session,
        },
    }))
}

// ---------------------------------------------------------------------------
// Curriculum
// ---------------------------------------------------------------------------

/// Request body for `POST /functions/generate-curriculum`.
#[derive(Debug, Deserialize)]
pub struct CurriculumRequest {
    pub topic: String,
    #[serde(default)]
    pub level: SkillLevel,
    /// Materialize the plan as a classroom with modules.
    #[serde(default)]
    pub create: bool,
}

/// Response for `POST /functions/generate-curriculum`.
#[derive(Debug, Serialize)]
pub struct CurriculumResponse {
    pub plan: Parsed<CurriculumPlan>,
    pub classroom: Option<Classroom>,
    pub modules: Vec<Module>,
}

/// POST /api/v1/functions/generate-curriculum
pub async fn generate_curriculum(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CurriculumRequest>,
) -> AppResult<Json<DataResponse<CurriculumResponse>>> {
    let topic = input.topic.trim();
    if topic.is_empty() {
        return Err(CoreError::Validation("topic must not be empty".into()).into());
    }

    let plan = CurriculumGenerator::new(state.generator.clone())
        .generate(topic, input.level)
        .await;

    let (classroom, modules) = if input.create {
        let (classroom, modules) = materialize(&state, &auth, plan.value()).await?;
        (Some(classroom), modules)
    } else {
        (None, Vec::new())
    };

    Ok(Json(DataResponse {
        data: CurriculumResponse {
            plan,
            classroom,
            modules,
        },
    }))
}

/// Create the planned classroom and its modules in plan order.
///
/// Everything is written in one transaction; a failure leaves no partial
/// classroom behind and publishes nothing.
async fn materialize(
    state: &AppState,
    auth: &AuthUser,
    plan: &CurriculumPlan,
) -> AppResult<(Classroom, Vec<Module>)> {
    let name = clamp_chars(&plan.classroom.name, MAX_CLASSROOM_NAME_LEN);
    validate_classroom_name(&name)?;
    let color = match validate_color(&plan.classroom.color) {
        Ok(()) => plan.classroom.color.as_str(),
        Err(_) => DEFAULT_CLASSROOM_COLOR,
    };

    let create = CreateClassroom {
        name,
        description: Some(plan.classroom.description.clone()),
        color: Some(color.to_string()),
    };
    let inputs = plan
        .modules
        .iter()
        .map(|planned| {
            let title = clamp_chars(&planned.title, MAX_MODULE_TITLE_LEN);
            validate_module_title(&title)?;
            Ok(CreateModule {
                title,
                description: Some(planned.description.clone()),
                content: planned.content.clone(),
                video_digests: Vec::new(),
            })
        })
        .collect::<Result<Vec<_>, CoreError>>()?;

    let (classroom, modules) =
        ClassroomRepo::create_with_modules(&state.pool, auth.user_id, &create, color, &inputs)
            .await?;

    tracing::info!(
        user_id = auth.user_id,
        classroom_id = classroom.id,
        modules = modules.len(),
        "Curriculum materialized"
    );

    state.change_bus.publish(
        ChangeEvent::created(ChangeTopic::Classrooms, auth.user_id).with_entity(classroom.id),
    );
    state.change_bus.publish(
        ChangeEvent::created(ChangeTopic::Modules, auth.user_id).with_parent(classroom.id),
    );
    Ok((classroom, modules))
}
