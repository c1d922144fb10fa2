//! Generative-AI access for the learning-space platform.
//!
//! - [`TextGenerator`]: the seam between the edge functions and a model.
//! - [`GeminiClient`]: HTTP implementation for a `generateContent` endpoint.
//! - [`ChatAssistant`]: one conversational turn of the prompt assistant.
//! - [`CurriculumGenerator`]: a classroom plus modules for a topic.
//!
//! Both edge functions always produce a value. Generator failures and
//! unusable model output surface as [`Parsed::Fallback`](learnspace_core::genai_parse::Parsed).

pub mod chat;
pub mod curriculum;
pub mod gemini;
pub mod generator;

pub use chat::{ChatAssistant, ChatTurn};
pub use curriculum::{CurriculumGenerator, SkillLevel};
pub use gemini::{GeminiClient, GeminiConfig};
pub use generator::{GenAiError, TextGenerator};
