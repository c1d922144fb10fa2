//! Profile vocabulary: job categories, interest tags, and favorites.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::ToolId;
use crate::error::CoreError;

/// Job category chosen at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobCategory {
    Student,
    Developer,
    Designer,
    Marketer,
    Educator,
    Researcher,
    Entrepreneur,
    Other,
}

impl JobCategory {
    pub const ALL: [JobCategory; 8] = [
        Self::Student,
        Self::Developer,
        Self::Designer,
        Self::Marketer,
        Self::Educator,
        Self::Researcher,
        Self::Entrepreneur,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Developer => "developer",
            Self::Designer => "designer",
            Self::Marketer => "marketer",
            Self::Educator => "educator",
            Self::Researcher => "researcher",
            Self::Entrepreneur => "entrepreneur",
            Self::Other => "other",
        }
    }
}

impl FromStr for JobCategory {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown job category '{s}'")))
    }
}

impl fmt::Display for JobCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interest tag chosen at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestTag {
    Writing,
    ImageGeneration,
    VideoGeneration,
    Audio,
    Coding,
    Research,
    Productivity,
    Education,
}

impl InterestTag {
    pub const ALL: [InterestTag; 8] = [
        Self::Writing,
        Self::ImageGeneration,
        Self::VideoGeneration,
        Self::Audio,
        Self::Coding,
        Self::Research,
        Self::Productivity,
        Self::Education,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Writing => "writing",
            Self::ImageGeneration => "image_generation",
            Self::VideoGeneration => "video_generation",
            Self::Audio => "audio",
            Self::Coding => "coding",
            Self::Research => "research",
            Self::Productivity => "productivity",
            Self::Education => "education",
        }
    }
}

impl FromStr for InterestTag {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown interest tag '{s}'")))
    }
}

/// Parse and de-duplicate interest tags, preserving first-seen order.
pub fn parse_interests<S: AsRef<str>>(raw: &[S]) -> Result<Vec<InterestTag>, CoreError> {
    let mut out = Vec::with_capacity(raw.len());
    for r in raw {
        let tag: InterestTag = r.as_ref().parse()?;
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    Ok(out)
}

/// Outcome of [`Favorites::toggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteChange {
    Added,
    Removed,
}

/// A set of favorite tools, kept in insertion order for stable display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites(Vec<ToolId>);

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from stored ids, dropping duplicates and ids the
    /// catalog no longer knows.
    pub fn from_stored<S: AsRef<str>>(stored: &[S]) -> Self {
        let mut favorites = Self::new();
        for raw in stored {
            if let Ok(id) = ToolId::parse(raw.as_ref()) {
                if !favorites.contains(&id) {
                    favorites.0.push(id);
                }
            }
        }
        favorites
    }

    pub fn contains(&self, id: &ToolId) -> bool {
        self.0.contains(id)
    }

    /// Add `id` if absent, remove it if present.
    pub fn toggle(&mut self, id: ToolId) -> FavoriteChange {
        match self.0.iter().position(|existing| existing == &id) {
            Some(pos) => {
                self.0.remove(pos);
                FavoriteChange::Removed
            }
            None => {
                self.0.push(id);
                FavoriteChange::Added
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolId> {
        self.0.iter()
    }

    /// String form written to `user_profiles.favorites`.
    pub fn to_stored(&self) -> Vec<String> {
        self.0.iter().map(|id| id.as_str().to_string()).collect()
    }
}
