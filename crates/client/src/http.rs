//! [`Backend`] implementation over the REST API.

use async_trait::async_trait;
use learnspace_core::types::DbId;
use learnspace_db::models::classroom::{Classroom, CreateClassroom, UpdateClassroom};
use learnspace_db::models::module::{CreateModule, Module, UpdateModule};
use learnspace_db::models::profile::{CreateProfile, UserProfile};
use learnspace_db::models::prompt::{
    CreatePromptMessage, CreatePromptSession, PromptMessage, PromptSession, UpdatePromptSession,
};
use learnspace_db::models::token::TokenBalance;
use learnspace_db::models::user::Identity;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;

use crate::backend::Backend;
use crate::config::ClientConfig;
use crate::error::ClientError;

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct AuthResponse {
    access_token: String,
    refresh_token: String,
    user: Identity,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    code: String,
}

#[derive(Default)]
struct Credentials {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

/// HTTP client for the `/api/v1` surface.
pub struct HttpBackend {
    client: reqwest::Client,
    api_url: String,
    credentials: RwLock<Credentials>,
}

impl HttpBackend {
    /// Build a client whose requests are bounded by `config.request_timeout`.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self {
            client,
            api_url: config.api_url(),
            credentials: RwLock::new(Credentials::default()),
        })
    }

    /// Restore previously persisted tokens.
    pub async fn restore(&self, access_token: String, refresh_token: Option<String>) {
        let mut creds = self.credentials.write().await;
        creds.access_token = Some(access_token);
        creds.refresh_token = refresh_token;
    }

    /// Current refresh token, for the caller to persist.
    pub async fn refresh_token(&self) -> Option<String> {
        self.credentials.read().await.refresh_token.clone()
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{path}", self.api_url));
        match &self.credentials.read().await.access_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = builder.send().await?;
        Self::ensure_success(response).await
    }

    /// Ensure the response has a success status code, mapping the
    /// `{error, code}` body on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (body.code, body.error),
            Err(_) => (String::new(), text),
        };
        Err(match status {
            StatusCode::UNAUTHORIZED => ClientError::Unauthorized(message),
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            StatusCode::BAD_REQUEST => ClientError::Validation(message),
            StatusCode::REQUEST_TIMEOUT => ClientError::Timeout,
            _ => ClientError::Api {
                status: status.as_u16(),
                code,
                message,
            },
        })
    }

    async fn data<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        let envelope: Envelope<T> = Self::send(builder).await?.json().await?;
        Ok(envelope.data)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        Self::data(self.request(Method::GET, path).await).await
    }

    async fn write<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        Self::data(self.request(method, path).await.json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        Self::send(self.request(Method::DELETE, path).await).await?;
        Ok(())
    }

    async fn authenticate(&self, path: &str, body: serde_json::Value) -> Result<Identity, ClientError> {
        let response = Self::send(self.client.post(format!("{}{path}", self.api_url)).json(&body))
            .await?;
        let auth: AuthResponse = response.json().await?;
        let mut creds = self.credentials.write().await;
        creds.access_token = Some(auth.access_token);
        creds.refresh_token = Some(auth.refresh_token);
        Ok(auth.user)
    }

    async fn clear(&self) {
        *self.credentials.write().await = Credentials::default();
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ClientError> {
        self.authenticate("/auth/login", json!({ "email": email, "password": password }))
            .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, ClientError> {
        self.authenticate("/auth/signup", json!({ "email": email, "password": password }))
            .await
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        let result = Self::send(self.request(Method::POST, "/auth/logout").await).await;
        self.clear().await;
        result.map(|_| ())
    }

    async fn current_identity(&self) -> Result<Option<Identity>, ClientError> {
        if self.credentials.read().await.access_token.is_some() {
            match self.get::<Identity>("/auth/session").await {
                Ok(identity) => return Ok(Some(identity)),
                Err(ClientError::Unauthorized(_)) => {}
                Err(e) => return Err(e),
            }
        }

        // Access token missing or expired: try the refresh token once.
        let Some(refresh_token) = self.credentials.read().await.refresh_token.clone() else {
            return Ok(None);
        };
        match self
            .authenticate("/auth/refresh", json!({ "refresh_token": refresh_token }))
            .await
        {
            Ok(identity) => Ok(Some(identity)),
            Err(ClientError::Unauthorized(_)) => {
                self.clear().await;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn access_token(&self) -> Option<String> {
        self.credentials.read().await.access_token.clone()
    }

    async fn fetch_profile(&self) -> Result<Option<UserProfile>, ClientError> {
        match self.get("/profile").await {
            Ok(profile) => Ok(Some(profile)),
            Err(ClientError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn insert_profile(&self, input: &CreateProfile) -> Result<UserProfile, ClientError> {
        self.write(Method::POST, "/profile", input).await
    }

    async fn write_favorites(&self, favorites: &[String]) -> Result<UserProfile, ClientError> {
        self.write(Method::PUT, "/profile/favorites", &json!({ "favorites": favorites }))
            .await
    }

    async fn write_paid(&self, is_paid: bool) -> Result<UserProfile, ClientError> {
        self.write(Method::PUT, "/profile/subscription", &json!({ "is_paid": is_paid }))
            .await
    }

    async fn fetch_tokens(&self) -> Result<TokenBalance, ClientError> {
        self.get("/tokens").await
    }

    async fn write_tokens(&self, balance: i32) -> Result<TokenBalance, ClientError> {
        self.write(Method::PUT, "/tokens", &json!({ "balance": balance }))
            .await
    }

    async fn list_classrooms(&self) -> Result<Vec<Classroom>, ClientError> {
        self.get("/classrooms").await
    }

    async fn create_classroom(&self, input: &CreateClassroom) -> Result<Classroom, ClientError> {
        self.write(Method::POST, "/classrooms", input).await
    }

    async fn update_classroom(
        &self,
        id: DbId,
        input: &UpdateClassroom,
    ) -> Result<Classroom, ClientError> {
        self.write(Method::PUT, &format!("/classrooms/{id}"), input)
            .await
    }

    async fn delete_classroom(&self, id: DbId) -> Result<(), ClientError> {
        self.delete(&format!("/classrooms/{id}")).await
    }

    async fn list_modules(&self, classroom_id: DbId) -> Result<Vec<Module>, ClientError> {
        self.get(&format!("/classrooms/{classroom_id}/modules"))
            .await
    }

    async fn create_module(
        &self,
        classroom_id: DbId,
        input: &CreateModule,
    ) -> Result<Module, ClientError> {
        self.write(
            Method::POST,
            &format!("/classrooms/{classroom_id}/modules"),
            input,
        )
        .await
    }

    async fn update_module(&self, id: DbId, input: &UpdateModule) -> Result<Module, ClientError> {
        self.write(Method::PUT, &format!("/modules/{id}"), input)
            .await
    }

    async fn delete_module(&self, id: DbId) -> Result<(), ClientError> {
        self.delete(&format!("/modules/{id}")).await
    }

    async fn reorder_modules(
        &self,
        classroom_id: DbId,
        module_ids: &[DbId],
    ) -> Result<Vec<Module>, ClientError> {
        self.write(
            Method::PUT,
            &format!("/classrooms/{classroom_id}/modules/reorder"),
            &json!({ "module_ids": module_ids }),
        )
        .await
    }

    async fn list_prompt_sessions(&self) -> Result<Vec<PromptSession>, ClientError> {
        self.get("/prompt-sessions").await
    }

    async fn create_prompt_session(
        &self,
        input: &CreatePromptSession,
    ) -> Result<PromptSession, ClientError> {
        self.write(Method::POST, "/prompt-sessions", input).await
    }

    async fn update_prompt_session(
        &self,
        id: DbId,
        input: &UpdatePromptSession,
    ) -> Result<PromptSession, ClientError> {
        self.write(Method::PUT, &format!("/prompt-sessions/{id}"), input)
            .await
    }

    async fn delete_prompt_session(&self, id: DbId) -> Result<(), ClientError> {
        self.delete(&format!("/prompt-sessions/{id}")).await
    }

    async fn list_prompt_messages(
        &self,
        session_id: DbId,
    ) -> Result<Vec<PromptMessage>, ClientError> {
        #[derive(Deserialize)]
        struct Transcript {
            messages: Vec<PromptMessage>,
        }
        let transcript: Transcript = self
            .get(&format!("/prompt-sessions/{session_id}/messages"))
            .await?;
        Ok(transcript.messages)
    }

    async fn append_prompt_message(
        &self,
        session_id: DbId,
        input: &CreatePromptMessage,
    ) -> Result<PromptMessage, ClientError> {
        self.write(
            Method::POST,
            &format!("/prompt-sessions/{session_id}/messages"),
            input,
        )
        .await
    }
}
