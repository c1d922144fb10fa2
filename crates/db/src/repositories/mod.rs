//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. User-owned rows are always
//! filtered by `user_id`, so another account's row reads as "not found".

pub mod auth_session_repo;
pub mod classroom_repo;
pub mod module_repo;
pub mod profile_repo;
pub mod progress_repo;
pub mod prompt_message_repo;
pub mod prompt_session_repo;
pub mod token_repo;
pub mod user_repo;
pub mod youtube_repo;

pub use auth_session_repo::AuthSessionRepo;
pub use classroom_repo::ClassroomRepo;
pub use module_repo::{ModuleRepo, ReorderOutcome};
pub use profile_repo::ProfileRepo;
pub use progress_repo::ProgressRepo;
pub use prompt_message_repo::PromptMessageRepo;
pub use prompt_session_repo::PromptSessionRepo;
pub use token_repo::TokenRepo;
pub use user_repo::UserRepo;
pub use youtube_repo::{ChannelRepo, DigestRepo};
