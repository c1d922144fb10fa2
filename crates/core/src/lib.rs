//! Domain vocabulary for the learning-space platform.
//!
//! Everything in this crate is pure: no I/O, no async. The database,
//! API, generative-AI and client crates build on these types.
//!
//! - [`catalog`] -- static tool catalog and the typed [`catalog::ToolId`].
//! - [`profile`] -- job categories, interest tags, and the favorites set.
//! - [`curriculum`] -- module content blocks and step numbering rules.
//! - [`genai_parse`] -- best-effort extraction of JSON from model replies.
//! - [`chat`] -- prompt-assistant transcript rules.
//! - [`billing`] -- checkout plans and token balance rules.

pub mod billing;
pub mod catalog;
pub mod chat;
pub mod curriculum;
pub mod error;
pub mod genai_parse;
pub mod profile;
pub mod types;
