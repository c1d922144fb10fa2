//! The change event envelope and its topic vocabulary.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use learnspace_core::types::DbId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ChangeTopic
// ---------------------------------------------------------------------------

/// The kind of entity a change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTopic {
    Classrooms,
    Modules,
    ModuleProgress,
    PromptSessions,
    PromptMessages,
    Profile,
    Tokens,
    Channels,
}

/// Returned when a topic or signal name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown change topic '{0}'")]
pub struct UnknownTopic(pub String);

impl ChangeTopic {
    pub const ALL: [ChangeTopic; 8] = [
        Self::Classrooms,
        Self::Modules,
        Self::ModuleProgress,
        Self::PromptSessions,
        Self::PromptMessages,
        Self::Profile,
        Self::Tokens,
        Self::Channels,
    ];

    /// Wire name of the topic.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Classrooms => "classrooms",
            Self::Modules => "modules",
            Self::ModuleProgress => "module_progress",
            Self::PromptSessions => "prompt_sessions",
            Self::PromptMessages => "prompt_messages",
            Self::Profile => "profile",
            Self::Tokens => "tokens",
            Self::Channels => "channels",
        }
    }

    /// Map a legacy refresh signal name onto its topic.
    ///
    /// Accepts `refreshLearningClassrooms` and `refreshPromptSessions`, and
    /// also any topic wire name.
    pub fn from_signal(name: &str) -> Result<Self, UnknownTopic> {
        match name {
            "refreshLearningClassrooms" => Ok(Self::Classrooms),
            "refreshPromptSessions" => Ok(Self::PromptSessions),
            other => other.parse(),
        }
    }
}

impl FromStr for ChangeTopic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTopic(s.to_string()))
    }
}

impl fmt::Display for ChangeTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ChangeKind
// ---------------------------------------------------------------------------

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
    /// No specific entity; listeners should refetch the whole topic.
    Refreshed,
}

// ---------------------------------------------------------------------------
// ChangeEvent
// ---------------------------------------------------------------------------

/// A change to one of an identity's collections.
///
/// Constructed via [`ChangeEvent::new`] or the kind shortcuts and enriched
/// with [`with_entity`](ChangeEvent::with_entity) and
/// [`with_parent`](ChangeEvent::with_parent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub topic: ChangeTopic,
    pub kind: ChangeKind,

    /// Identity whose data changed. Only that identity's subscribers see it.
    pub user_id: DbId,

    /// Id of the changed row, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<DbId>,

    /// Id of the scoping parent (classroom for modules, session for messages).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<DbId>,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(topic: ChangeTopic, kind: ChangeKind, user_id: DbId) -> Self {
        Self {
            topic,
            kind,
            user_id,
            entity_id: None,
            parent_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn created(topic: ChangeTopic, user_id: DbId) -> Self {
        Self::new(topic, ChangeKind::Created, user_id)
    }

    pub fn updated(topic: ChangeTopic, user_id: DbId) -> Self {
        Self::new(topic, ChangeKind::Updated, user_id)
    }

    pub fn deleted(topic: ChangeTopic, user_id: DbId) -> Self {
        Self::new(topic, ChangeKind::Deleted, user_id)
    }

    pub fn refreshed(topic: ChangeTopic, user_id: DbId) -> Self {
        Self::new(topic, ChangeKind::Refreshed, user_id)
    }

    /// Attach the changed row's id.
    pub fn with_entity(mut self, entity_id: DbId) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    /// Attach the scoping parent's id.
    pub fn with_parent(mut self, parent_id: DbId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_signals_map_to_topics() {
        assert_eq!(
            ChangeTopic::from_signal("refreshLearningClassrooms"),
            Ok(ChangeTopic::Classrooms)
        );
        assert_eq!(
            ChangeTopic::from_signal("refreshPromptSessions"),
            Ok(ChangeTopic::PromptSessions)
        );
        assert_eq!(ChangeTopic::from_signal("tokens"), Ok(ChangeTopic::Tokens));
        assert!(ChangeTopic::from_signal("refreshEverything").is_err());
    }

    #[test]
    fn topic_names_round_trip() {
        for topic in ChangeTopic::ALL {
            assert_eq!(topic.as_str().parse::<ChangeTopic>(), Ok(topic));
            let json = serde_json::to_value(topic).unwrap();
            assert_eq!(json, topic.as_str());
        }
    }

    #[test]
    fn builder_sets_optional_ids() {
        let event = ChangeEvent::created(ChangeTopic::Modules, 7)
            .with_entity(42)
            .with_parent(3);
        assert_eq!(event.kind, ChangeKind::Created);
        assert_eq!(event.user_id, 7);
        assert_eq!(event.entity_id, Some(42));
        assert_eq!(event.parent_id, Some(3));
    }

    #[test]
    fn wire_format_omits_absent_ids() {
        let event = ChangeEvent::refreshed(ChangeTopic::Classrooms, 1);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["topic"], "classrooms");
        assert_eq!(json["kind"], "refreshed");
        assert!(json.get("entity_id").is_none());

        let back: ChangeEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
