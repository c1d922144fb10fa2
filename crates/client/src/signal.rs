//! Named refresh signals.
//!
//! Older screens trigger a sidebar refresh by name
//! (`refreshLearningClassrooms`, `refreshPromptSessions`). [`signal`]
//! maps such a name onto its typed topic and publishes a
//! [`ChangeKind::Refreshed`](learnspace_events::ChangeKind::Refreshed)
//! event for it.

use learnspace_core::types::DbId;
use learnspace_events::{ChangeBus, ChangeEvent, ChangeTopic, UnknownTopic};

/// Publish a refresh for the topic named `name` and return that topic.
///
/// Unknown names publish nothing.
pub fn signal(bus: &ChangeBus, user_id: DbId, name: &str) -> Result<ChangeTopic, UnknownTopic> {
    let topic = ChangeTopic::from_signal(name)?;
    bus.publish(ChangeEvent::refreshed(topic, user_id));
    Ok(topic)
}

#[cfg(test)]
mod tests {
    use learnspace_events::ChangeKind;

    use super::*;

    #[tokio::test]
    async fn legacy_name_publishes_refresh() {
        let bus = ChangeBus::default();
        let mut rx = bus.subscribe();

        let topic = signal(&bus, 7, "refreshLearningClassrooms").unwrap();
        assert_eq!(topic, ChangeTopic::Classrooms);

        let event = rx.recv().await.unwrap();
        assert_eq!(event.topic, ChangeTopic::Classrooms);
        assert_eq!(event.kind, ChangeKind::Refreshed);
        assert_eq!(event.user_id, 7);
    }

    #[test]
    fn topic_wire_names_are_accepted() {
        let bus = ChangeBus::default();
        assert_eq!(signal(&bus, 1, "prompt_sessions"), Ok(ChangeTopic::PromptSessions));
        assert_eq!(signal(&bus, 1, "refreshPromptSessions"), Ok(ChangeTopic::PromptSessions));
    }

    #[test]
    fn unknown_name_publishes_nothing() {
        let bus = ChangeBus::default();
        let mut rx = bus.subscribe();
        assert_eq!(
            signal(&bus, 1, "refreshEverything"),
            Err(UnknownTopic("refreshEverything".into()))
        );
        assert!(rx.try_recv().is_err());
    }
}
