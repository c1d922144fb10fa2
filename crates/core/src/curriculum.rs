//! Classroom and module content rules.
//!
//! Module step numbers inside one classroom form the dense sequence
//! `1..=N`. The database layer calls [`renumber`] after every reorder and
//! delete so that invariant holds after each write.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum classroom name length.
pub const MAX_CLASSROOM_NAME_LEN: usize = 120;

/// Maximum module title length.
pub const MAX_MODULE_TITLE_LEN: usize = 200;

/// Color given to classrooms created without one.
pub const DEFAULT_CLASSROOM_COLOR: &str = "#6366F1";

static HEX_COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid regex"));

/// One typed block of module content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        body: String,
    },
    Code {
        #[serde(default)]
        language: Option<String>,
        source: String,
    },
    Exercise {
        prompt: String,
        #[serde(default)]
        solution: Option<String>,
    },
}

/// A summarized video attached to a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDigestRef {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub summary: Option<String>,
}

/// Validate a `#RRGGBB` color string.
pub fn validate_color(color: &str) -> Result<(), CoreError> {
    if HEX_COLOR_RE.is_match(color) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "color must be a #RRGGBB hex string, got '{color}'"
        )))
    }
}

/// Validate a classroom name: non-blank and within length.
pub fn validate_classroom_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("classroom name must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_CLASSROOM_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "classroom name must be at most {MAX_CLASSROOM_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a module title: non-blank and within length.
pub fn validate_module_title(title: &str) -> Result<(), CoreError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("module title must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_MODULE_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "module title must be at most {MAX_MODULE_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Trim `value` and cut it to at most `max` characters.
///
/// Used for generated names and titles, which are shortened rather than
/// rejected. The cut never splits a character.
pub fn clamp_chars(value: &str, max: usize) -> String {
    let trimmed = value.trim();
    match trimmed.char_indices().nth(max) {
        Some((end, _)) => trimmed[..end].trim_end().to_string(),
        None => trimmed.to_string(),
    }
}

/// Step number for a module appended after `existing` steps.
pub fn next_step_number(existing: &[i32]) -> i32 {
    existing.iter().copied().max().unwrap_or(0) + 1
}

/// Assign the contiguous sequence `1..=N` to `ordered_ids`.
pub fn renumber(ordered_ids: &[DbId]) -> Vec<(DbId, i32)> {
    ordered_ids
        .iter()
        .enumerate()
        .map(|(i, id)| (*id, i as i32 + 1))
        .collect()
}

/// Check that `requested` is a permutation of `current`.
///
/// A reorder request must name every module of the classroom exactly once.
pub fn validate_reorder(current: &[DbId], requested: &[DbId]) -> Result<(), CoreError> {
    if current.len() != requested.len() {
        return Err(CoreError::Validation(format!(
            "reorder must list all {} modules, got {}",
            current.len(),
            requested.len()
        )));
    }
    let mut seen = HashSet::with_capacity(requested.len());
    for id in requested {
        if !seen.insert(*id) {
            return Err(CoreError::Validation(format!(
                "module {id} listed more than once"
            )));
        }
    }
    let current: HashSet<_> = current.iter().copied().collect();
    if let Some(stray) = requested.iter().find(|id| !current.contains(id)) {
        return Err(CoreError::Validation(format!(
            "module {stray} does not belong to this classroom"
        )));
    }
    Ok(())
}

/// Whether `steps` is exactly `1..=steps.len()` once sorted.
pub fn is_contiguous(steps: &[i32]) -> bool {
    let mut sorted = steps.to_vec();
    sorted.sort_unstable();
    sorted.iter().enumerate().all(|(i, s)| *s == i as i32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renumber_assigns_one_based_sequence() {
        assert_eq!(renumber(&[30, 10, 20]), vec![(30, 1), (10, 2), (20, 3)]);
        assert!(renumber(&[]).is_empty());
    }

    #[test]
    fn renumber_output_is_contiguous() {
        let steps: Vec<i32> = renumber(&[5, 9, 2, 7]).into_iter().map(|(_, s)| s).collect();
        assert!(is_contiguous(&steps));
    }

    #[test]
    fn contiguity_detects_gaps_and_duplicates() {
        assert!(is_contiguous(&[2, 1, 3]));
        assert!(is_contiguous(&[]));
        assert!(!is_contiguous(&[1, 3]));
        assert!(!is_contiguous(&[1, 1, 2]));
    }

    #[test]
    fn next_step_follows_max() {
        assert_eq!(next_step_number(&[]), 1);
        assert_eq!(next_step_number(&[1, 2, 5]), 6);
    }

    #[test]
    fn reorder_accepts_permutation() {
        assert!(validate_reorder(&[1, 2, 3], &[3, 1, 2]).is_ok());
    }

    #[test]
    fn reorder_rejects_missing_duplicate_or_foreign() {
        assert!(validate_reorder(&[1, 2, 3], &[1, 2]).is_err());
        assert!(validate_reorder(&[1, 2, 3], &[1, 1, 2]).is_err());
        assert!(validate_reorder(&[1, 2, 3], &[1, 2, 99]).is_err());
    }

    #[test]
    fn color_validation() {
        assert!(validate_color("#A1b2C3").is_ok());
        assert!(validate_color(DEFAULT_CLASSROOM_COLOR).is_ok());
        assert!(validate_color("A1B2C3").is_err());
        assert!(validate_color("#FFF").is_err());
        assert!(validate_color("#GGGGGG").is_err());
    }

    #[test]
    fn classroom_name_must_not_be_blank() {
        assert!(validate_classroom_name("  ").is_err());
        assert!(validate_classroom_name("Rust 101").is_ok());
        assert!(validate_classroom_name(&"x".repeat(MAX_CLASSROOM_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn clamp_cuts_on_char_boundary() {
        assert_eq!(clamp_chars("  short  ", 10), "short");
        assert_eq!(clamp_chars("héllo wörld", 7), "héllo w");
        assert_eq!(clamp_chars("ab cd", 3), "ab");

        let long = "é".repeat(MAX_CLASSROOM_NAME_LEN + 30);
        let clamped = clamp_chars(&long, MAX_CLASSROOM_NAME_LEN);
        assert_eq!(clamped.chars().count(), MAX_CLASSROOM_NAME_LEN);
        assert!(validate_classroom_name(&clamped).is_ok());
    }

    #[test]
    fn content_blocks_use_type_tag() {
        let json = serde_json::json!([
            {"type": "text", "body": "Intro"},
            {"type": "code", "language": "rust", "source": "fn main() {}"},
            {"type": "exercise", "prompt": "Write a loop"}
        ]);
        let blocks: Vec<ContentBlock> = serde_json::from_value(json).unwrap();
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[2],
            ContentBlock::Exercise {
                prompt: "Write a loop".into(),
                solution: None
            }
        );
    }
}
