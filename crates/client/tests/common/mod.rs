//! In-memory [`Backend`] for exercising client state without a server.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use learnspace_client::{Backend, ClientError};
use learnspace_core::curriculum::{next_step_number, renumber};
use learnspace_core::types::DbId;
use learnspace_db::models::classroom::{Classroom, CreateClassroom, UpdateClassroom};
use learnspace_db::models::module::{CreateModule, Module, UpdateModule};
use learnspace_db::models::profile::{CreateProfile, UserProfile};
use learnspace_db::models::prompt::{
    CreatePromptMessage, CreatePromptSession, PromptMessage, PromptSession, UpdatePromptSession,
};
use learnspace_db::models::token::TokenBalance;
use learnspace_db::models::user::Identity;
use learnspace_events::ChangeBus;
use sqlx::types::Json;

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "correct-horse-battery";

#[derive(Default)]
struct Data {
    next_id: DbId,
    account: Option<(String, String, Identity)>,
    signed_in: Option<Identity>,
    profile: Option<UserProfile>,
    tokens: i32,
    classrooms: Vec<Classroom>,
    modules: Vec<Module>,
    sessions: Vec<PromptSession>,
    messages: Vec<PromptMessage>,
}

impl Data {
    fn id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn user_id(&self) -> Result<DbId, ClientError> {
        self.signed_in
            .as_ref()
            .map(|i| i.id)
            .ok_or_else(|| ClientError::Unauthorized("not signed in".into()))
    }

    fn renumber(&mut self, classroom_id: DbId, ordered: &[DbId]) {
        for (id, step) in renumber(ordered) {
            if let Some(m) = self.modules.iter_mut().find(|m| m.id == id) {
                m.step_number = step;
            }
        }
        let count = ordered.len() as i64;
        if let Some(c) = self.classrooms.iter_mut().find(|c| c.id == classroom_id) {
            c.module_count = count;
        }
    }

    fn modules_of(&self, classroom_id: DbId) -> Vec<Module> {
        let mut modules: Vec<_> = self
            .modules
            .iter()
            .filter(|m| m.classroom_id == classroom_id)
            .cloned()
            .collect();
        modules.sort_by_key(|m| m.step_number);
        modules
    }
}

/// Backend double that records calls and can be told to fail or stall.
#[derive(Default)]
pub struct MemoryBackend {
    data: Mutex<Data>,
    calls: Mutex<HashMap<&'static str, usize>>,
    delay: Mutex<Option<Duration>>,
    pub fail_profile_insert: AtomicBool,
    pub fail_sign_out: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A backend with one registered account, not signed in.
    pub fn with_account() -> Arc<Self> {
        let backend = Self::new();
        {
            let mut data = backend.data.lock().unwrap();
            let id = data.id();
            data.account = Some((
                EMAIL.into(),
                PASSWORD.into(),
                Identity {
                    id,
                    email: EMAIL.into(),
                },
            ));
            data.tokens = 10;
        }
        backend
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn fail(&self, flag: &AtomicBool) {
        flag.store(true, Ordering::SeqCst);
    }

    pub fn stored_favorites(&self) -> Vec<String> {
        self.data
            .lock()
            .unwrap()
            .profile
            .as_ref()
            .map(|p| p.favorites.clone())
            .unwrap_or_default()
    }

    pub fn stored_tokens(&self) -> i32 {
        self.data.lock().unwrap().tokens
    }

    /// Insert a classroom behind the client's back, as another device would.
    pub fn insert_classroom_directly(&self, name: &str) -> DbId {
        let mut data = self.data.lock().unwrap();
        let user_id = data.account.as_ref().map(|a| a.2.id).unwrap_or(1);
        let id = data.id();
        let now = Utc::now();
        data.classrooms.push(Classroom {
            id,
            user_id,
            name: name.into(),
            description: String::new(),
            color: "#6366F1".into(),
            module_count: 0,
            created_at: now,
            updated_at: now,
        });
        id
    }

    async fn hit(&self, op: &'static str) {
        *self.calls.lock().unwrap().entry(op).or_default() += 1;
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }

    fn read_guard(&self) -> Result<(), ClientError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("connection reset".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, ClientError> {
        self.hit("sign_in").await;
        let mut data = self.data.lock().unwrap();
        match &data.account {
            Some((e, p, identity)) if e == email && p == password => {
                let identity = identity.clone();
                data.signed_in = Some(identity.clone());
                Ok(identity)
            }
            _ => Err(ClientError::Unauthorized("Invalid email or password".into())),
        }
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, ClientError> {
        self.hit("sign_up").await;
        let mut data = self.data.lock().unwrap();
        if data.account.is_some() {
            return Err(ClientError::Api {
                status: 409,
                code: "CONFLICT".into(),
                message: "email already registered".into(),
            });
        }
        let identity = Identity {
            id: data.id(),
            email: email.into(),
        };
        data.account = Some((email.into(), password.into(), identity.clone()));
        data.signed_in = Some(identity.clone());
        data.tokens = 10;
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        self.hit("sign_out").await;
        if self.fail_sign_out.load(Ordering::SeqCst) {
            return Err(ClientError::Transport("offline".into()));
        }
        self.data.lock().unwrap().signed_in = None;
        Ok(())
    }

    async fn current_identity(&self) -> Result<Option<Identity>, ClientError> {
        self.hit("current_identity").await;
        Ok(self.data.lock().unwrap().signed_in.clone())
    }

    /// Changes every time `current_identity` runs, like a refreshed token.
    async fn access_token(&self) -> Option<String> {
        let refreshes = self.calls("current_identity");
        self.data
            .lock()
            .unwrap()
            .signed_in
            .as_ref()
            .map(|i| format!("token-{}-{refreshes}", i.id))
    }

    async fn fetch_profile(&self) -> Result<Option<UserProfile>, ClientError> {
        self.hit("fetch_profile").await;
        self.read_guard()?;
        let data = self.data.lock().unwrap();
        data.user_id()?;
        Ok(data.profile.clone())
    }

    async fn insert_profile(&self, input: &CreateProfile) -> Result<UserProfile, ClientError> {
        self.hit("insert_profile").await;
        if self.fail_profile_insert.load(Ordering::SeqCst) {
            return Err(ClientError::Api {
                status: 500,
                code: "INTERNAL_ERROR".into(),
                message: "insert failed".into(),
            });
        }
        let mut data = self.data.lock().unwrap();
        let user_id = data.user_id()?;
        let now = Utc::now();
        let profile = UserProfile {
            id: data.id(),
            user_id,
            display_name: input.display_name.clone(),
            phone: input.phone.clone(),
            job_category: input.job_category.clone(),
            interests: input.interests.clone(),
            favorites: Vec::new(),
            is_paid: false,
            created_at: now,
            updated_at: now,
        };
        data.profile = Some(profile.clone());
        Ok(profile)
    }

    async fn write_favorites(&self, favorites: &[String]) -> Result<UserProfile, ClientError> {
        self.hit("write_favorites").await;
        let mut data = self.data.lock().unwrap();
        let profile = data
            .profile
            .as_mut()
            .ok_or_else(|| ClientError::NotFound("profile".into()))?;
        profile.favorites = favorites.to_vec();
        Ok(profile.clone())
    }

    async fn write_paid(&self, is_paid: bool) -> Result<UserProfile, ClientError> {
        self.hit("write_paid").await;
        let mut data = self.data.lock().unwrap();
        let profile = data
            .profile
            .as_mut()
            .ok_or_else(|| ClientError::NotFound("profile".into()))?;
        profile.is_paid = is_paid;
        Ok(profile.clone())
    }

    async fn fetch_tokens(&self) -> Result<TokenBalance, ClientError> {
        self.hit("fetch_tokens").await;
        self.read_guard()?;
        let data = self.data.lock().unwrap();
        Ok(TokenBalance {
            user_id: data.user_id()?,
            balance: data.tokens,
            updated_at: Utc::now(),
        })
    }

    async fn write_tokens(&self, balance: i32) -> Result<TokenBalance, ClientError> {
        self.hit("write_tokens").await;
        let mut data = self.data.lock().unwrap();
        data.tokens = balance;
        Ok(TokenBalance {
            user_id: data.user_id()?,
            balance,
            updated_at: Utc::now(),
        })
    }

    async fn list_classrooms(&self) -> Result<Vec<Classroom>, ClientError> {
        self.hit("list_classrooms").await;
        self.read_guard()?;
        Ok(self.data.lock().unwrap().classrooms.clone())
    }

    async fn create_classroom(&self, input: &CreateClassroom) -> Result<Classroom, ClientError> {
        self.hit("create_classroom").await;
        let mut data = self.data.lock().unwrap();
        let user_id = data.user_id()?;
        let now = Utc::now();
        let classroom = Classroom {
            id: data.id(),
            user_id,
            name: input.name.clone(),
            description: input.description.clone().unwrap_or_default(),
            color: input.color.clone().unwrap_or_else(|| "#6366F1".into()),
            module_count: 0,
            created_at: now,
            updated_at: now,
        };
        data.classrooms.push(classroom.clone());
        Ok(classroom)
    }

    async fn update_classroom(
        &self,
        id: DbId,
        input: &UpdateClassroom,
    ) -> Result<Classroom, ClientError> {
        self.hit("update_classroom").await;
        let mut data = self.data.lock().unwrap();
        let classroom = data
            .classrooms
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("Classroom {id}")))?;
        if let Some(name) = &input.name {
            classroom.name = name.clone();
        }
        if let Some(color) = &input.color {
            classroom.color = color.clone();
        }
        Ok(classroom.clone())
    }

    async fn delete_classroom(&self, id: DbId) -> Result<(), ClientError> {
        self.hit("delete_classroom").await;
        let mut data = self.data.lock().unwrap();
        data.classrooms.retain(|c| c.id != id);
        data.modules.retain(|m| m.classroom_id != id);
        Ok(())
    }

    async fn list_modules(&self, classroom_id: DbId) -> Result<Vec<Module>, ClientError> {
        self.hit("list_modules").await;
        self.read_guard()?;
        Ok(self.data.lock().unwrap().modules_of(classroom_id))
    }

    async fn create_module(
        &self,
        classroom_id: DbId,
        input: &CreateModule,
    ) -> Result<Module, ClientError> {
        self.hit("create_module").await;
        let mut data = self.data.lock().unwrap();
        let steps: Vec<i32> = data
            .modules_of(classroom_id)
            .iter()
            .map(|m| m.step_number)
            .collect();
        let now = Utc::now();
        let module = Module {
            id: data.id(),
            classroom_id,
            title: input.title.clone(),
            description: input.description.clone().unwrap_or_default(),
            step_number: next_step_number(&steps),
            content: Json(input.content.clone()),
            video_digests: Json(input.video_digests.clone()),
            created_at: now,
            updated_at: now,
        };
        data.modules.push(module.clone());
        if let Some(c) = data.classrooms.iter_mut().find(|c| c.id == classroom_id) {
            c.module_count += 1;
        }
        Ok(module)
    }

    async fn update_module(&self, id: DbId, input: &UpdateModule) -> Result<Module, ClientError> {
        self.hit("update_module").await;
        let mut data = self.data.lock().unwrap();
        let module = data
            .modules
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("Module {id}")))?;
        if let Some(title) = &input.title {
            module.title = title.clone();
        }
        Ok(module.clone())
    }

    async fn delete_module(&self, id: DbId) -> Result<(), ClientError> {
        self.hit("delete_module").await;
        let mut data = self.data.lock().unwrap();
        let Some(classroom_id) = data.modules.iter().find(|m| m.id == id).map(|m| m.classroom_id)
        else {
            return Err(ClientError::NotFound(format!("Module {id}")));
        };
        data.modules.retain(|m| m.id != id);
        let remaining: Vec<DbId> = data.modules_of(classroom_id).iter().map(|m| m.id).collect();
        data.renumber(classroom_id, &remaining);
        Ok(())
    }

    async fn reorder_modules(
        &self,
        classroom_id: DbId,
        module_ids: &[DbId],
    ) -> Result<Vec<Module>, ClientError> {
        self.hit("reorder_modules").await;
        let mut data = self.data.lock().unwrap();
        data.renumber(classroom_id, module_ids);
        Ok(data.modules_of(classroom_id))
    }

    async fn list_prompt_sessions(&self) -> Result<Vec<PromptSession>, ClientError> {
        self.hit("list_prompt_sessions").await;
        self.read_guard()?;
        Ok(self.data.lock().unwrap().sessions.clone())
    }

    async fn create_prompt_session(
        &self,
        input: &CreatePromptSession,
    ) -> Result<PromptSession, ClientError> {
        self.hit("create_prompt_session").await;
        let mut data = self.data.lock().unwrap();
        let user_id = data.user_id()?;
        let now = Utc::now();
        let session = PromptSession {
            id: data.id(),
            user_id,
            title: input.title.clone().unwrap_or_else(|| "New chat".into()),
            main_prompt: input.main_prompt.clone(),
            tags: input.tags.clone(),
            is_favorite: false,
            created_at: now,
            updated_at: now,
        };
        data.sessions.push(session.clone());
        Ok(session)
    }

    async fn update_prompt_session(
        &self,
        id: DbId,
        input: &UpdatePromptSession,
    ) -> Result<PromptSession, ClientError> {
        self.hit("update_prompt_session").await;
        let mut data = self.data.lock().unwrap();
        let session = data
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("Prompt session {id}")))?;
        if let Some(title) = &input.title {
            session.title = title.clone();
        }
        if let Some(is_favorite) = input.is_favorite {
            session.is_favorite = is_favorite;
        }
        Ok(session.clone())
    }

    async fn delete_prompt_session(&self, id: DbId) -> Result<(), ClientError> {
        self.hit("delete_prompt_session").await;
        let mut data = self.data.lock().unwrap();
        data.sessions.retain(|s| s.id != id);
        data.messages.retain(|m| m.session_id != id);
        Ok(())
    }

    async fn list_prompt_messages(
        &self,
        session_id: DbId,
    ) -> Result<Vec<PromptMessage>, ClientError> {
        self.hit("list_prompt_messages").await;
        self.read_guard()?;
        Ok(self
            .data
            .lock()
            .unwrap()
            .messages
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn append_prompt_message(
        &self,
        session_id: DbId,
        input: &CreatePromptMessage,
    ) -> Result<PromptMessage, ClientError> {
        self.hit("append_prompt_message").await;
        let mut data = self.data.lock().unwrap();
        let message = PromptMessage {
            id: data.id(),
            session_id,
            sender: input.sender.clone(),
            content: input.content.clone(),
            suggests_learning_space: input.suggests_learning_space,
            created_at: Utc::now(),
        };
        data.messages.push(message.clone());
        Ok(message)
    }
}

pub fn bus() -> Arc<ChangeBus> {
    Arc::new(ChangeBus::default())
}

pub fn profile_input() -> CreateProfile {
    CreateProfile {
        display_name: "Ada".into(),
        phone: None,
        job_category: Some("developer".into()),
        interests: vec!["coding".into()],
    }
}

/// Poll `check` until it holds, failing after two seconds.
pub async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !check().await {
        assert!(tokio::time::Instant::now() < deadline, "condition not met in time");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Sign the account in on the backend and return its id.
pub async fn signed_in(backend: &MemoryBackend) -> DbId {
    backend.sign_in(EMAIL, PASSWORD).await.unwrap().id
}
