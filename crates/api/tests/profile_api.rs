//! HTTP-level tests for the profile, favorites, subscription and token endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json_auth, put_json_auth, signup, signup_with_profile};
use learnspace_events::{ChangeKind, ChangeTopic};
use sqlx::PgPool;

fn favorites(json: &serde_json::Value) -> Vec<String> {
    let mut out: Vec<String> = json["favorites"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect();
    out.sort();
    out
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_profile_insert_starts_empty_and_unpaid(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signup_with_profile(app.clone(), "p1@example.com").await;

    let response = get_auth(app, "/api/v1/profile", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["display_name"], "Tester");
    assert_eq!(json["data"]["is_paid"], false);
    assert!(json["data"]["favorites"].as_array().unwrap().is_empty());
    assert_eq!(json["data"]["interests"][0], "coding");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_missing_profile_is_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signup(app.clone(), "noprofile@example.com").await;

    let response = get_auth(app, "/api/v1/profile", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_second_profile_insert_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signup_with_profile(app.clone(), "twice@example.com").await;

    let body = serde_json::json!({ "display_name": "Again" });
    let response = post_json_auth(app, "/api/v1/profile", body, &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_interest_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signup(app.clone(), "interest@example.com").await;

    let body = serde_json::json!({ "display_name": "X", "interests": ["juggling"] });
    let response = post_json_auth(app, "/api/v1/profile", body, &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_toggle_adds_to_existing_favorites(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signup_with_profile(app.clone(), "fav@example.com").await;

    let response = put_json_auth(
        app.clone(),
        "/api/v1/profile/favorites",
        serde_json::json!({ "favorites": ["chatgpt"] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json_auth(
        app,
        "/api/v1/profile/favorites/toggle",
        serde_json::json!({ "tool_id": "claude" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["change"], "added");
    assert_eq!(favorites(&json["data"]["profile"]), vec!["chatgpt", "claude"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_toggle_twice_restores_original(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signup_with_profile(app.clone(), "twice-fav@example.com").await;

    for expected in ["added", "removed"] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/profile/favorites/toggle",
            serde_json::json!({ "tool_id": "Midjourney" }),
            &token,
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["data"]["change"], expected);
    }

    let response = get_auth(app, "/api/v1/profile", &token).await;
    assert!(favorites(&body_json(response).await["data"]).is_empty());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_unknown_tool_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let token = signup_with_profile(app.clone(), "badtool@example.com").await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/profile/favorites/toggle",
        serde_json::json!({ "tool_id": "not-a-tool" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        app,
        "/api/v1/profile/favorites",
        serde_json::json!({ "favorites": ["claude", "nope"] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_subscription_and_tokens(pool: PgPool) {
    let (app, bus) = common::build_test_app_with(pool, common::StubGenerator::failing());
    let token = signup_with_profile(app.clone(), "paid@example.com").await;
    let mut rx = bus.subscribe();

    let response = put_json_auth(
        app.clone(),
        "/api/v1/profile/subscription",
        serde_json::json!({ "is_paid": true }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_paid"], true);
    let event = rx.recv().await.unwrap();
    assert_eq!(event.topic, ChangeTopic::Profile);
    assert_eq!(event.kind, ChangeKind::Updated);

    let response = put_json_auth(
        app.clone(),
        "/api/v1/tokens",
        serde_json::json!({ "balance": 42 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(rx.recv().await.unwrap().topic, ChangeTopic::Tokens);

    let response = get_auth(app.clone(), "/api/v1/tokens", &token).await;
    assert_eq!(body_json(response).await["data"]["balance"], 42);

    let response = put_json_auth(
        app,
        "/api/v1/tokens",
        serde_json::json!({ "balance": -1 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
