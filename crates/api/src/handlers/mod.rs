//! Request handlers, one module per resource.

pub mod auth;
pub mod billing;
pub mod classrooms;
pub mod functions;
pub mod modules;
pub mod news;
pub mod profile;
pub mod prompt_sessions;
pub mod tokens;
