//! Prompt-assistant transcript rules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of a session title derived from the first message.
pub const MAX_SESSION_TITLE_LEN: usize = 60;

/// Title given to a session before the first message arrives.
pub const DEFAULT_SESSION_TITLE: &str = "New chat";

/// Author of a prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Ai => "ai",
        }
    }
}

impl FromStr for Sender {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "ai" => Ok(Self::Ai),
            other => Err(CoreError::Validation(format!("unknown sender '{other}'"))),
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Index of the message after which "Create Learning Space" is offered.
///
/// `messages` yields `(sender, suggests_learning_space)` in transcript
/// order. Only AI messages can carry the suggestion; the action attaches
/// to the latest one that did, and to no earlier message.
pub fn learning_space_action_index<I>(messages: I) -> Option<usize>
where
    I: IntoIterator<Item = (Sender, bool)>,
{
    messages
        .into_iter()
        .enumerate()
        .filter(|(_, (sender, suggests))| *sender == Sender::Ai && *suggests)
        .map(|(i, _)| i)
        .last()
}

/// Derive a session title from the first user message.
pub fn session_title_from(first_message: &str) -> String {
    let collapsed = first_message.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return DEFAULT_SESSION_TITLE.to_string();
    }
    if collapsed.chars().count() <= MAX_SESSION_TITLE_LEN {
        return collapsed;
    }
    let mut title: String = collapsed.chars().take(MAX_SESSION_TITLE_LEN - 3).collect();
    title.truncate(title.trim_end().len());
    title.push_str("...");
    title
}

/// Validate message content before it is persisted.
pub fn validate_message_content(content: &str) -> Result<(), CoreError> {
    if content.trim().is_empty() {
        return Err(CoreError::Validation("message must not be empty".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_appears_after_suggesting_message_only() {
        let transcript = [
            (Sender::User, false),
            (Sender::Ai, false),
            (Sender::User, false),
            (Sender::Ai, true),
        ];
        assert_eq!(learning_space_action_index(transcript), Some(3));
    }

    #[test]
    fn latest_suggestion_wins() {
        let transcript = [
            (Sender::Ai, true),
            (Sender::User, false),
            (Sender::Ai, true),
            (Sender::User, false),
        ];
        assert_eq!(learning_space_action_index(transcript), Some(2));
    }

    #[test]
    fn user_messages_cannot_suggest() {
        assert_eq!(learning_space_action_index([(Sender::User, true)]), None);
        assert_eq!(learning_space_action_index(Vec::new()), None);
    }

    #[test]
    fn title_from_short_message() {
        assert_eq!(session_title_from("  how do   I prompt?  "), "how do I prompt?");
        assert_eq!(session_title_from("   "), DEFAULT_SESSION_TITLE);
    }

    #[test]
    fn title_is_truncated() {
        let title = session_title_from(&"word ".repeat(40));
        assert!(title.ends_with("..."));
        assert!(title.chars().count() <= MAX_SESSION_TITLE_LEN);
    }

    #[test]
    fn sender_round_trip() {
        assert_eq!("ai".parse::<Sender>().unwrap(), Sender::Ai);
        assert_eq!(Sender::User.to_string(), "user");
        assert!("bot".parse::<Sender>().is_err());
    }

    #[test]
    fn empty_message_rejected() {
        assert!(validate_message_content(" \n ").is_err());
        assert!(validate_message_content("hi").is_ok());
    }
}
