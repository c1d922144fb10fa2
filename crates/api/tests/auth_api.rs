//! HTTP-level tests for signup, login, refresh, logout and session.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, get_auth, post_json, post_json_auth};
use learnspace_core::billing::SIGNUP_TOKEN_GRANT;
use sqlx::PgPool;

const PASSWORD: &str = "correct-horse-battery";

async fn signup_json(app: axum::Router, email: &str) -> serde_json::Value {
    let body = serde_json::json!({ "email": email, "password": PASSWORD });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_signup_grants_tokens(pool: PgPool) {
    let app = common::build_test_app(pool);

    let json = signup_json(app.clone(), "Ada@Example.com").await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["user"]["email"], "ada@example.com");

    let token = json["access_token"].as_str().unwrap();
    let response = get_auth(app, "/api/v1/tokens", token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["balance"], SIGNUP_TOKEN_GRANT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_signup_conflicts(pool: PgPool) {
    let app = common::build_test_app(pool);
    signup_json(app.clone(), "dup@example.com").await;

    let body = serde_json::json!({ "email": "dup@example.com", "password": PASSWORD });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_signup_validates_input(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = serde_json::json!({ "email": "not-an-email", "password": "short" });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_and_session(pool: PgPool) {
    let app = common::build_test_app(pool);
    let created = signup_json(app.clone(), "grace@example.com").await;

    let body = serde_json::json!({ "email": "grace@example.com", "password": PASSWORD });
    let response = post_json(app.clone(), "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user"]["id"], created["user"]["id"]);

    let token = json["access_token"].as_str().unwrap();
    let response = get_auth(app, "/api/v1/auth/session", token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["email"], "grace@example.com");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    let app = common::build_test_app(pool);
    signup_json(app.clone(), "wrong@example.com").await;

    let body = serde_json::json!({ "email": "wrong@example.com", "password": "not-the-password" });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_session_requires_token(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/auth/session").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_auth(app, "/api/v1/auth/session", "garbage").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_refresh_rotates_and_logout_revokes(pool: PgPool) {
    let app = common::build_test_app(pool);
    let json = signup_json(app.clone(), "rotate@example.com").await;
    let access = json["access_token"].as_str().unwrap().to_string();
    let refresh = json["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await;
    let new_refresh = rotated["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(new_refresh, refresh);

    // The old refresh token is spent.
    let response = post_json(
        app.clone(),
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json_auth(app.clone(), "/api/v1/auth/logout", serde_json::json!({}), &access).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        serde_json::json!({ "refresh_token": new_refresh }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
