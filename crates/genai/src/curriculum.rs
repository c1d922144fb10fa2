//! Curriculum generation for a topic.

use std::fmt;
use std::sync::Arc;

use learnspace_core::genai_parse::{parse_curriculum, CurriculumPlan, FallbackReason, Parsed};
use serde::{Deserialize, Serialize};

use crate::generator::TextGenerator;

/// Learner level the plan is pitched at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        })
    }
}

/// Builds classroom plans from a [`TextGenerator`].
pub struct CurriculumGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl CurriculumGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Plan a classroom on `topic` for a learner at `level`.
    ///
    /// Never fails: on a generator error or unusable output the canned
    /// three-module plan is returned as [`Parsed::Fallback`].
    pub async fn generate(&self, topic: &str, level: SkillLevel) -> Parsed<CurriculumPlan> {
        let prompt = build_prompt(topic, level);

        match self.generator.generate(&prompt).await {
            Ok(text) => {
                let parsed = parse_curriculum(&text, topic);
                if let Some(reason) = parsed.reason() {
                    tracing::warn!(
                        model = self.generator.model_name(),
                        topic,
                        reason = ?reason,
                        "Curriculum was not structured, using fallback"
                    );
                }
                parsed
            }
            Err(e) => {
                tracing::error!(
                    model = self.generator.model_name(),
                    topic,
                    error = %e,
                    "Curriculum generation failed"
                );
                Parsed::fallback(
                    CurriculumPlan::fallback(topic),
                    FallbackReason::GeneratorFailed(e.to_string()),
                )
            }
        }
    }
}

fn build_prompt(topic: &str, level: SkillLevel) -> String {
    format!(
        "Design a short course on \"{topic}\" for a {level} learner.\n\
         Answer ONLY with a JSON object of this shape:\n\
         {{\"classroom\": {{\"name\": string, \"description\": string, \"color\": \"#RRGGBB\"}},\n \
         \"modules\": [{{\"title\": string, \"description\": string, \"content\": [\n   \
         {{\"type\": \"text\", \"body\": string}} |\n   \
         {{\"type\": \"code\", \"language\": string, \"source\": string}} |\n   \
         {{\"type\": \"exercise\", \"prompt\": string, \"solution\": string}}\n \
         ]}}]}}\n\
         Use 3 to 7 modules, ordered from first to last step.",
        topic = topic.trim(),
    )
}
