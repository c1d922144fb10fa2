#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use learnspace_api::auth::jwt::JwtConfig;
use learnspace_api::config::ServerConfig;
use learnspace_api::router::build_app_router;
use learnspace_api::state::AppState;
use learnspace_api::ws::WsManager;
use learnspace_events::ChangeBus;
use learnspace_genai::{GenAiError, GeminiConfig, TextGenerator};
use sqlx::PgPool;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 1,
        },
        genai: GeminiConfig {
            api_url: "http://127.0.0.1:9".to_string(),
            api_key: String::new(),
            model: "stub".to_string(),
            timeout: Duration::from_secs(1),
        },
        checkout_base_url: "http://localhost:5173".to_string(),
    }
}

/// Generator that answers every prompt with a fixed string, or fails.
pub struct StubGenerator {
    reply: Option<String>,
}

impl StubGenerator {
    pub fn ok(reply: impl Into<String>) -> Arc<dyn TextGenerator> {
        Arc::new(Self {
            reply: Some(reply.into()),
        })
    }

    pub fn failing() -> Arc<dyn TextGenerator> {
        Arc::new(Self { reply: None })
    }
}

#[async_trait]
impl TextGenerator for StubGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenAiError> {
        self.reply.clone().ok_or(GenAiError::Timeout)
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

/// Build the full application router against `pool` with a failing
/// generator, so edge functions take their fallback branch.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, StubGenerator::failing()).0
}

/// Build the application router with a chosen generator and return the
/// change bus so tests can observe published events.
pub fn build_test_app_with(
    pool: PgPool,
    generator: Arc<dyn TextGenerator>,
) -> (Router, Arc<ChangeBus>) {
    let config = test_config();
    let change_bus = Arc::new(ChangeBus::default());
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::new(WsManager::new()),
        change_bus: Arc::clone(&change_bus),
        generator,
    };
    (build_app_router(state, &config), change_bus)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, "GET", uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "GET", uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, "POST", uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, "POST", uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, "PUT", uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "DELETE", uri, Some(token), None).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Sign up through the API and return the access token.
pub async fn signup(app: Router, email: &str) -> String {
    let body = serde_json::json!({ "email": email, "password": "correct-horse-battery" });
    let response = post_json(app, "/api/v1/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["access_token"].as_str().unwrap().to_string()
}

/// Sign up and insert a profile, returning the access token.
pub async fn signup_with_profile(app: Router, email: &str) -> String {
    let token = signup(app.clone(), email).await;
    let body = serde_json::json!({ "display_name": "Tester", "interests": ["coding"] });
    let response = post_json_auth(app, "/api/v1/profile", body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    token
}
