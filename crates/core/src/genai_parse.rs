//! Best-effort structured parsing of generative-AI replies.
//!
//! Models are asked to answer with a JSON object but frequently wrap it in
//! prose or code fences, or ignore the instruction entirely. The parsers
//! here scan for the first `{` ... last `}` span, deserialize it, check the
//! required fields, and return a [`Parsed`] value. A parse never fails: the
//! failure branch carries a usable default object alongside the reason.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::curriculum::{
    clamp_chars, validate_color, ContentBlock, DEFAULT_CLASSROOM_COLOR, MAX_CLASSROOM_NAME_LEN,
    MAX_MODULE_TITLE_LEN,
};

/// Greedy `{...}` span, dot matching newlines.
static JSON_SPAN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"));

/// Maximum number of tags kept from a chat reply.
pub const MAX_REPLY_TAGS: usize = 5;

/// Reply used when the model produced nothing usable at all.
pub const DEFAULT_CHAT_REPLY: &str =
    "Sorry, I couldn't come up with a good answer to that. Could you rephrase your request?";

/// Why a reply fell back to the default object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FallbackReason {
    /// No `{...}` span in the reply.
    NoJson,
    /// A span was found but did not deserialize.
    InvalidJson(String),
    /// The object deserialized but a required field was missing or empty.
    MissingField(&'static str),
    /// The generator call itself failed (network, quota, timeout).
    GeneratorFailed(String),
}

/// Outcome of a best-effort parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Parsed<T> {
    Structured { value: T },
    Fallback { value: T, reason: FallbackReason },
}

impl<T> Parsed<T> {
    pub fn structured(value: T) -> Self {
        Self::Structured { value }
    }

    pub fn fallback(value: T, reason: FallbackReason) -> Self {
        Self::Fallback { value, reason }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Structured { value } | Self::Fallback { value, .. } => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Self::Structured { value } | Self::Fallback { value, .. } => value,
        }
    }

    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            Self::Structured { .. } => None,
            Self::Fallback { reason, .. } => Some(reason),
        }
    }
}

/// Return the first `{` ... last `}` span of `text`, if any.
pub fn extract_json_span(text: &str) -> Option<&str> {
    JSON_SPAN_RE.find(text).map(|m| m.as_str())
}

fn decode_span<T: for<'de> Deserialize<'de>>(text: &str) -> Result<T, FallbackReason> {
    let span = extract_json_span(text).ok_or(FallbackReason::NoJson)?;
    serde_json::from_str(span).map_err(|e| FallbackReason::InvalidJson(e.to_string()))
}

// ---------------------------------------------------------------------------
// Chat replies
// ---------------------------------------------------------------------------

/// A conversational turn from the prompt assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub main_prompt: Option<String>,
    pub tags: Vec<String>,
    pub suggest_learning_space: bool,
}

impl ChatReply {
    /// Plain reply with no extracted metadata.
    pub fn plain(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            main_prompt: None,
            tags: Vec::new(),
            suggest_learning_space: false,
        }
    }
}

#[derive(Deserialize)]
struct RawChatReply {
    #[serde(default)]
    reply: Option<String>,
    #[serde(default)]
    main_prompt: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    suggest_learning_space: bool,
}

/// Parse a chat turn.
///
/// When the model ignored the JSON instruction, the trimmed free text is
/// still a useful reply, so it becomes the fallback's `reply`.
pub fn parse_chat_reply(text: &str) -> Parsed<ChatReply> {
    let free_text = || {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            ChatReply::plain(DEFAULT_CHAT_REPLY)
        } else {
            ChatReply::plain(trimmed)
        }
    };

    let raw: RawChatReply = match decode_span(text) {
        Ok(raw) => raw,
        Err(reason) => return Parsed::fallback(free_text(), reason),
    };

    let reply = raw.reply.map(|r| r.trim().to_string()).unwrap_or_default();
    if reply.is_empty() {
        return Parsed::fallback(
            ChatReply::plain(DEFAULT_CHAT_REPLY),
            FallbackReason::MissingField("reply"),
        );
    }

    Parsed::structured(ChatReply {
        reply,
        main_prompt: raw
            .main_prompt
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty()),
        tags: normalize_tags(&raw.tags),
        suggest_learning_space: raw.suggest_learning_space,
    })
}

/// Lowercase, trim, de-duplicate, and cap tags at [`MAX_REPLY_TAGS`].
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let t = tag.as_ref().trim().to_lowercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
        if out.len() == MAX_REPLY_TAGS {
            break;
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Curriculum plans
// ---------------------------------------------------------------------------

/// Classroom part of a generated curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedClassroom {
    pub name: String,
    pub description: String,
    pub color: String,
}

/// One module of a generated curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedModule {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// A generated classroom with its ordered modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurriculumPlan {
    pub classroom: PlannedClassroom,
    pub modules: Vec<PlannedModule>,
}

impl CurriculumPlan {
    /// Canned classroom used when the model output is unusable.
    pub fn fallback(topic: &str) -> Self {
        let topic = match topic.trim() {
            "" => "New Topic",
            t => t,
        };
        let module = |title: &str, description: String, body: String| PlannedModule {
            title: title.to_string(),
            description,
            content: vec![ContentBlock::Text { body }],
        };
        Self {
            classroom: PlannedClassroom {
                name: clamp_chars(topic, MAX_CLASSROOM_NAME_LEN),
                description: format!("A structured learning path for {topic}."),
                color: DEFAULT_CLASSROOM_COLOR.to_string(),
            },
            modules: vec![
                module(
                    "Introduction",
                    format!("What {topic} is and why it matters."),
                    format!("Start by collecting a short definition of {topic} in your own words."),
                ),
                module(
                    "Core Concepts",
                    format!("The key ideas behind {topic}."),
                    format!("List the three most important concepts in {topic} and explain each."),
                ),
                module(
                    "Practice",
                    format!("Apply {topic} to a small project."),
                    format!("Pick a small, concrete task and complete it using {topic}."),
                ),
            ],
        }
    }
}

#[derive(Deserialize)]
struct RawPlan {
    #[serde(default)]
    classroom: Option<RawClassroom>,
    #[serde(default)]
    modules: Vec<RawModule>,
}

#[derive(Deserialize)]
struct RawClassroom {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    color: Option<String>,
}

#[derive(Deserialize)]
struct RawModule {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    content: Vec<ContentBlock>,
}

/// Parse a curriculum-generation reply for `topic`.
///
/// Modules with a blank title are dropped; an invalid color is replaced by
/// [`DEFAULT_CLASSROOM_COLOR`]. Over-long names and titles are cut to the
/// classroom and module limits, so a structured plan always passes the
/// create-time validation. A plan with no classroom name or no remaining
/// modules falls back to [`CurriculumPlan::fallback`].
pub fn parse_curriculum(text: &str, topic: &str) -> Parsed<CurriculumPlan> {
    let raw: RawPlan = match decode_span(text) {
        Ok(raw) => raw,
        Err(reason) => return Parsed::fallback(CurriculumPlan::fallback(topic), reason),
    };

    let Some(classroom) = raw.classroom.filter(|c| !c.name.trim().is_empty()) else {
        return Parsed::fallback(
            CurriculumPlan::fallback(topic),
            FallbackReason::MissingField("classroom.name"),
        );
    };

    let modules: Vec<PlannedModule> = raw
        .modules
        .into_iter()
        .filter(|m| !m.title.trim().is_empty())
        .map(|m| PlannedModule {
            title: clamp_chars(&m.title, MAX_MODULE_TITLE_LEN),
            description: m.description.trim().to_string(),
            content: m.content,
        })
        .collect();

    if modules.is_empty() {
        return Parsed::fallback(
            CurriculumPlan::fallback(topic),
            FallbackReason::MissingField("modules"),
        );
    }

    let color = classroom
        .color
        .filter(|c| validate_color(c).is_ok())
        .unwrap_or_else(|| DEFAULT_CLASSROOM_COLOR.to_string());

    Parsed::structured(CurriculumPlan {
        classroom: PlannedClassroom {
            name: clamp_chars(&classroom.name, MAX_CLASSROOM_NAME_LEN),
            description: classroom.description.trim().to_string(),
            color,
        },
        modules,
    })
}
