//! Static AI tool catalog.
//!
//! Profiles reference tools by id (the lowercase tool name). [`ToolId`]
//! can only be constructed for ids present in [`TOOLS`], so a favorites
//! set never contains a dangling reference.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Broad grouping used by the directory filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCategory {
    Chat,
    Image,
    Video,
    Audio,
    Writing,
    Coding,
    Research,
    Productivity,
}

impl ToolCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Writing => "writing",
            Self::Coding => "coding",
            Self::Research => "research",
            Self::Productivity => "productivity",
        }
    }
}

/// A catalog entry.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Tool {
    /// Lowercase tool name; the value stored in `user_profiles.favorites`.
    pub id: &'static str,
    pub name: &'static str,
    pub category: ToolCategory,
    pub url: &'static str,
}

/// The tool directory.
pub const TOOLS: &[Tool] = &[
    Tool { id: "chatgpt", name: "ChatGPT", category: ToolCategory::Chat, url: "https://chat.openai.com" },
    Tool { id: "claude", name: "Claude", category: ToolCategory::Chat, url: "https://claude.ai" },
    Tool { id: "gemini", name: "Gemini", category: ToolCategory::Chat, url: "https://gemini.google.com" },
    Tool { id: "perplexity", name: "Perplexity", category: ToolCategory::Research, url: "https://www.perplexity.ai" },
    Tool { id: "midjourney", name: "Midjourney", category: ToolCategory::Image, url: "https://www.midjourney.com" },
    Tool { id: "dall-e", name: "DALL-E", category: ToolCategory::Image, url: "https://openai.com/dall-e-3" },
    Tool { id: "stable diffusion", name: "Stable Diffusion", category: ToolCategory::Image, url: "https://stability.ai" },
    Tool { id: "runway", name: "Runway", category: ToolCategory::Video, url: "https://runwayml.com" },
    Tool { id: "synthesia", name: "Synthesia", category: ToolCategory::Video, url: "https://www.synthesia.io" },
    Tool { id: "elevenlabs", name: "ElevenLabs", category: ToolCategory::Audio, url: "https://elevenlabs.io" },
    Tool { id: "jasper", name: "Jasper", category: ToolCategory::Writing, url: "https://www.jasper.ai" },
    Tool { id: "grammarly", name: "Grammarly", category: ToolCategory::Writing, url: "https://www.grammarly.com" },
    Tool { id: "github copilot", name: "GitHub Copilot", category: ToolCategory::Coding, url: "https://github.com/features/copilot" },
    Tool { id: "cursor", name: "Cursor", category: ToolCategory::Coding, url: "https://www.cursor.com" },
    Tool { id: "notion ai", name: "Notion AI", category: ToolCategory::Productivity, url: "https://www.notion.so/product/ai" },
];

/// Look up a catalog entry by its exact id.
pub fn find(id: &str) -> Option<&'static Tool> {
    TOOLS.iter().find(|t| t.id == id)
}

/// Linear, case-insensitive filter over tool name and category.
///
/// An empty `query` matches every tool; `category` narrows further when set.
pub fn search(query: &str, category: Option<ToolCategory>) -> Vec<&'static Tool> {
    let needle = query.trim().to_lowercase();
    TOOLS
        .iter()
        .filter(|t| category.map_or(true, |c| t.category == c))
        .filter(|t| {
            needle.is_empty()
                || t.name.to_lowercase().contains(&needle)
                || t.category.as_str().contains(&needle)
        })
        .collect()
}

/// Identifier of a tool known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolId(String);

impl ToolId {
    /// Normalize `raw` (trim + lowercase) and check it against the catalog.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let key = raw.trim().to_lowercase();
        if key.is_empty() {
            return Err(CoreError::Validation("tool id must not be empty".into()));
        }
        match find(&key) {
            Some(tool) => Ok(Self(tool.id.to_string())),
            None => Err(CoreError::Validation(format!("unknown tool '{key}'"))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The catalog entry this id refers to.
    pub fn tool(&self) -> Option<&'static Tool> {
        find(&self.0)
    }
}

impl TryFrom<String> for ToolId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ToolId> for String {
    fn from(id: ToolId) -> Self {
        id.0
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_are_lowercase_and_unique() {
        let mut seen = std::collections::HashSet::new();
        for tool in TOOLS {
            assert_eq!(tool.id, tool.id.to_lowercase(), "{} must be lowercase", tool.id);
            assert!(seen.insert(tool.id), "duplicate id {}", tool.id);
        }
    }

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        let id = ToolId::parse("  ChatGPT ").unwrap();
        assert_eq!(id.as_str(), "chatgpt");
        assert_eq!(id.tool().unwrap().name, "ChatGPT");
    }

    #[test]
    fn parse_accepts_multi_word_names() {
        assert_eq!(ToolId::parse("GitHub Copilot").unwrap().as_str(), "github copilot");
    }

    #[test]
    fn parse_rejects_unknown_tool() {
        assert!(matches!(
            ToolId::parse("not-a-tool"),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn parse_rejects_empty() {
        assert!(ToolId::parse("   ").is_err());
    }

    #[test]
    fn deserialize_validates_against_catalog() {
        let ok: ToolId = serde_json::from_str("\"claude\"").unwrap();
        assert_eq!(ok.as_str(), "claude");
        assert!(serde_json::from_str::<ToolId>("\"bogus\"").is_err());
    }

    #[test]
    fn search_is_case_insensitive() {
        let hits = search("CLAU", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "claude");
    }

    #[test]
    fn search_by_category_name() {
        let hits = search("image", None);
        assert!(hits.iter().all(|t| t.category == ToolCategory::Image));
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn search_empty_query_with_category_filter() {
        let hits = search("", Some(ToolCategory::Coding));
        let ids: Vec<_> = hits.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["github copilot", "cursor"]);
    }

    #[test]
    fn search_empty_query_returns_everything() {
        assert_eq!(search("", None).len(), TOOLS.len());
    }
}
