//! The prompt assistant's conversational turn.

use std::sync::Arc;

use learnspace_core::chat::Sender;
use learnspace_core::genai_parse::{
    parse_chat_reply, ChatReply, FallbackReason, Parsed, DEFAULT_CHAT_REPLY,
};
use serde::{Deserialize, Serialize};

use crate::generator::TextGenerator;

/// Number of most recent transcript turns included in the prompt.
const HISTORY_WINDOW: usize = 20;

const INSTRUCTIONS: &str = "\
You are a friendly assistant that helps people write better prompts for AI tools \
and decide what to learn next.
Answer ONLY with a JSON object of this shape:
{\"reply\": string, \"main_prompt\": string or null, \"tags\": [string], \"suggest_learning_space\": boolean}
- reply: your answer to the user, markdown allowed.
- main_prompt: a short phrase naming the topic the user is working on.
- tags: up to 5 short lowercase keywords.
- suggest_learning_space: true when the user would benefit from a structured \
learning space (classroom) on this topic.";

/// One turn of transcript history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub sender: Sender,
    pub content: String,
}

/// Produces assistant replies from a [`TextGenerator`].
pub struct ChatAssistant {
    generator: Arc<dyn TextGenerator>,
}

impl ChatAssistant {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Answer `user_message` given the earlier transcript.
    ///
    /// Never fails: a generator error or unusable output yields
    /// [`Parsed::Fallback`] with a displayable reply.
    pub async fn reply(&self, history: &[ChatTurn], user_message: &str) -> Parsed<ChatReply> {
        let prompt = build_prompt(history, user_message);

        match self.generator.generate(&prompt).await {
            Ok(text) => {
                let parsed = parse_chat_reply(&text);
                if let Some(reason) = parsed.reason() {
                    tracing::warn!(
                        model = self.generator.model_name(),
                        reason = ?reason,
                        "Chat reply was not structured, using fallback"
                    );
                }
                parsed
            }
            Err(e) => {
                tracing::error!(
                    model = self.generator.model_name(),
                    error = %e,
                    "Chat generation failed"
                );
                Parsed::fallback(
                    ChatReply::plain(DEFAULT_CHAT_REPLY),
                    FallbackReason::GeneratorFailed(e.to_string()),
                )
            }
        }
    }
}

fn build_prompt(history: &[ChatTurn], user_message: &str) -> String {
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let mut prompt = String::from(INSTRUCTIONS);
    prompt.push_str("\n\nConversation so far:\n");
    for turn in &history[start..] {
        let who = match turn.sender {
            Sender::User => "User",
            Sender::Ai => "Assistant",
        };
        prompt.push_str(who);
        prompt.push_str(": ");
        prompt.push_str(turn.content.trim());
        prompt.push('\n');
    }
    prompt.push_str("User: ");
    prompt.push_str(user_message.trim());
    prompt.push_str("\nAssistant (JSON only):");
    prompt
}
