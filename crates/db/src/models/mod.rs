//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! Row structs also derive [`ts_rs::TS`] so the web front-end can share
//! their shapes.

pub mod auth_session;
pub mod classroom;
pub mod module;
pub mod profile;
pub mod progress;
pub mod prompt;
pub mod token;
pub mod user;
pub mod youtube;
