//! Collection scoping, write-through with refetch, and change events.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use common::{bus, signed_in, MemoryBackend};
use learnspace_client::collection::{Classrooms, Modules, PromptMessages, PromptSessions};
use learnspace_client::{ClientError, Collection};
use learnspace_db::models::classroom::{CreateClassroom, UpdateClassroom};
use learnspace_db::models::module::CreateModule;
use learnspace_db::models::prompt::{CreatePromptMessage, CreatePromptSession, UpdatePromptSession};
use learnspace_events::{ChangeBus, ChangeKind, ChangeTopic};

const TIMEOUT: Duration = Duration::from_secs(5);

fn classroom(name: &str) -> CreateClassroom {
    CreateClassroom {
        name: name.into(),
        description: None,
        color: None,
    }
}

fn module(title: &str) -> CreateModule {
    CreateModule {
        title: title.into(),
        description: None,
        content: Vec::new(),
        video_digests: Vec::new(),
    }
}

fn message(sender: &str, content: &str) -> CreatePromptMessage {
    CreatePromptMessage {
        sender: sender.into(),
        content: content.into(),
        suggests_learning_space: false,
    }
}

#[tokio::test]
async fn absent_identity_yields_empty_list_without_calls() {
    let backend = MemoryBackend::with_account();
    backend.insert_classroom_directly("Hidden");
    let classrooms = Collection::new(Classrooms, backend.clone(), bus(), TIMEOUT);

    classrooms.refetch().await;

    assert!(classrooms.items().await.is_empty());
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn absent_parent_yields_empty_list_without_calls() {
    let backend = MemoryBackend::with_account();
    let user_id = signed_in(&backend).await;
    let modules = Collection::new(Modules, backend.clone(), bus(), TIMEOUT);
    modules.set_user(Some(user_id)).await;

    modules.refetch().await;

    assert!(modules.items().await.is_empty());
    assert_eq!(backend.calls("list_modules"), 0);
    assert_matches!(
        modules.create(&module("Intro")).await,
        Err(ClientError::Validation(_))
    );
    assert_eq!(backend.calls("create_module"), 0);
}

#[tokio::test]
async fn mutations_require_identity() {
    let backend = MemoryBackend::with_account();
    let classrooms = Collection::new(Classrooms, backend.clone(), bus(), TIMEOUT);

    assert_matches!(
        classrooms.create(&classroom("Rust")).await,
        Err(ClientError::NotSignedIn)
    );
    assert_eq!(backend.total_calls(), 0);
}

#[tokio::test]
async fn create_refetches_and_shows_item_once() {
    let backend = MemoryBackend::with_account();
    let user_id = signed_in(&backend).await;
    let bus = bus();
    let mut rx = bus.subscribe();
    let classrooms = Collection::new(Classrooms, backend.clone(), bus.clone(), TIMEOUT);
    classrooms.set_user(Some(user_id)).await;

    let created = classrooms.create(&classroom("Rust")).await.unwrap();

    let state = classrooms.state().await;
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].id, created.id);
    assert!(!state.loading);
    assert_eq!(backend.calls("list_classrooms"), 1);

    let event = rx.recv().await.unwrap();
    assert_eq!(event.topic, ChangeTopic::Classrooms);
    assert_eq!(event.kind, ChangeKind::Created);
    assert_eq!(event.entity_id, Some(created.id));
    assert_eq!(event.user_id, user_id);
}

#[tokio::test]
async fn update_and_delete_write_through() {
    let backend = MemoryBackend::with_account();
    let user_id = signed_in(&backend).await;
    let classrooms = Collection::new(Classrooms, backend.clone(), bus(), TIMEOUT);
    classrooms.set_user(Some(user_id)).await;
    let created = classrooms.create(&classroom("Rust")).await.unwrap();

    let update = UpdateClassroom {
        name: Some("Rust 201".into()),
        ..Default::default()
    };
    classrooms.update(created.id, &update).await.unwrap();
    assert_eq!(classrooms.items().await[0].name, "Rust 201");

    classrooms.delete(created.id).await.unwrap();
    assert!(classrooms.items().await.is_empty());
    assert_eq!(backend.calls("list_classrooms"), 3);
}

#[tokio::test]
async fn read_failure_is_stored_not_returned() {
    let backend = MemoryBackend::with_account();
    let user_id = signed_in(&backend).await;
    let classrooms = Collection::new(Classrooms, backend.clone(), bus(), TIMEOUT);
    classrooms.set_user(Some(user_id)).await;
    classrooms.create(&classroom("Rust")).await.unwrap();

    backend.fail(&backend.fail_reads);
    classrooms.refetch().await;

    let state = classrooms.state().await;
    assert!(state.error.as_deref().unwrap().contains("connection reset"));
    assert_eq!(state.items.len(), 1);
    assert!(!state.loading);
}

#[tokio::test]
async fn module_steps_stay_contiguous() {
    let backend = MemoryBackend::with_account();
    let user_id = signed_in(&backend).await;
    let bus = bus();
    let classrooms = Collection::new(Classrooms, backend.clone(), bus.clone(), TIMEOUT);
    classrooms.set_user(Some(user_id)).await;
    let room = classrooms.create(&classroom("Rust")).await.unwrap();

    let modules = Collection::new(Modules, backend.clone(), bus.clone(), TIMEOUT);
    modules.set_user(Some(user_id)).await;
    modules.set_parent(Some(room.id)).await;

    let a = modules.create(&module("Ownership")).await.unwrap();
    let b = modules.create(&module("Borrowing")).await.unwrap();
    let c = modules.create(&module("Lifetimes")).await.unwrap();
    let steps: Vec<i32> = modules.items().await.iter().map(|m| m.step_number).collect();
    assert_eq!(steps, vec![1, 2, 3]);

    let mut rx = bus.subscribe();
    modules.reorder(&[c.id, a.id, b.id]).await.unwrap();
    let order: Vec<_> = modules
        .items()
        .await
        .iter()
        .map(|m| (m.id, m.step_number))
        .collect();
    assert_eq!(order, vec![(c.id, 1), (a.id, 2), (b.id, 3)]);

    let event = rx.recv().await.unwrap();
    assert_eq!(event.topic, ChangeTopic::Modules);
    assert_eq!(event.parent_id, Some(room.id));

    modules.delete(c.id).await.unwrap();
    let order: Vec<_> = modules
        .items()
        .await
        .iter()
        .map(|m| (m.id, m.step_number))
        .collect();
    assert_eq!(order, vec![(a.id, 1), (b.id, 2)]);
}

#[tokio::test]
async fn append_pushes_locally_without_refetch() {
    let backend = MemoryBackend::with_account();
    let user_id = signed_in(&backend).await;
    let bus = Arc::new(ChangeBus::default());
    let sessions = Collection::new(PromptSessions, backend.clone(), bus.clone(), TIMEOUT);
    sessions.set_user(Some(user_id)).await;
    let session = sessions
        .create(&CreatePromptSession::default())
        .await
        .unwrap();

    let messages = Collection::new(PromptMessages, backend.clone(), bus.clone(), TIMEOUT);
    messages.set_user(Some(user_id)).await;
    messages.set_parent(Some(session.id)).await;
    messages.refetch().await;
    let reads = backend.calls("list_prompt_messages");

    let mut rx = bus.subscribe();
    messages.append(&message("user", "teach me rust")).await.unwrap();
    messages.append(&message("ai", "sure")).await.unwrap();

    let items = messages.items().await;
    assert_eq!(
        items.iter().map(|m| m.sender.as_str()).collect::<Vec<_>>(),
        vec!["user", "ai"]
    );
    assert_eq!(backend.calls("list_prompt_messages"), reads);

    let event = rx.recv().await.unwrap();
    assert_eq!(event.topic, ChangeTopic::PromptMessages);
    assert_eq!(event.parent_id, Some(session.id));
}

#[tokio::test]
async fn session_favorite_flag_round_trips() {
    let backend = MemoryBackend::with_account();
    let user_id = signed_in(&backend).await;
    let sessions = Collection::new(PromptSessions, backend.clone(), bus(), TIMEOUT);
    sessions.set_user(Some(user_id)).await;
    let session = sessions
        .create(&CreatePromptSession::default())
        .await
        .unwrap();

    let update = UpdatePromptSession {
        is_favorite: Some(true),
        ..Default::default()
    };
    sessions.update(session.id, &update).await.unwrap();
    assert!(sessions.items().await[0].is_favorite);
}

#[tokio::test]
async fn cancelled_collection_skips_fetches() {
    let backend = MemoryBackend::with_account();
    let user_id = signed_in(&backend).await;
    let classrooms = Collection::new(Classrooms, backend.clone(), bus(), TIMEOUT);
    classrooms.set_user(Some(user_id)).await;

    classrooms.cancel();
    classrooms.refetch().await;
    assert_eq!(backend.calls("list_classrooms"), 0);

    classrooms.resume();
    classrooms.refetch().await;
    assert_eq!(backend.calls("list_classrooms"), 1);
}

#[tokio::test]
async fn slow_fetch_times_out_into_error_state() {
    let backend = MemoryBackend::with_account();
    let user_id = signed_in(&backend).await;
    backend.set_delay(Some(Duration::from_millis(500)));
    let classrooms = Collection::new(Classrooms, backend.clone(), bus(), Duration::from_millis(50));
    classrooms.set_user(Some(user_id)).await;

    classrooms.refetch().await;

    let state = classrooms.state().await;
    assert_eq!(state.error.as_deref(), Some("Request timed out"));
    assert!(!state.loading);
}
