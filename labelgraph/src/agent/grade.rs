//! Relevance grader: routes retrieved context to answer generation or a rewrite.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::graph::{RouteKey, Router};
use crate::llm::{invoke_typed, LlmClient, OutputSchema, StructuredOutput};
use crate::message::Message;
use crate::prompts::format_template;
use crate::transcript::Transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relevance {
    Relevant,
    NotRelevant,
}

impl RouteKey for Relevance {
    const VARIANTS: &'static [Self] = &[Relevance::Relevant, Relevance::NotRelevant];
}

/// Binary relevance score produced by the grader model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GradeDocuments {
    pub binary_score: String,
}

impl GradeDocuments {
    /// Exactly `"yes"` is relevant; anything else, including `"YES"` or `" yes"`, is not.
    pub fn relevance(&self) -> Relevance {
        if self.binary_score == "yes" {
            Relevance::Relevant
        } else {
            Relevance::NotRelevant
        }
    }
}

impl StructuredOutput for GradeDocuments {
    fn output_schema() -> OutputSchema {
        OutputSchema {
            name: "GradeDocuments".to_string(),
            description: "Grade documents using a binary score for relevance check.".to_string(),
            schema: json!({
                "type": "object",
                "properties": {
                    "binary_score": {
                        "type": "string",
                        "description": "Relevance score: 'yes' if relevant, or 'no' if not relevant"
                    }
                },
                "required": ["binary_score"]
            }),
        }
    }
}

/// Grades the latest message against the first user question. Appends nothing.
pub struct GradeRouter {
    llm: Arc<dyn LlmClient>,
    template: String,
}

impl GradeRouter {
    /// `template` uses `{question}` and `{context}`.
    pub fn new(llm: Arc<dyn LlmClient>, template: impl Into<String>) -> Self {
        Self {
            llm,
            template: template.into(),
        }
    }
}

#[async_trait]
impl Router<Relevance> for GradeRouter {
    async fn route(&self, transcript: &Transcript) -> Result<Relevance, AgentError> {
        let question = transcript.first_user().unwrap_or_default();
        let latest = transcript.last();
        if !latest.is_some_and(Message::is_tool_result) {
            warn!("grading a message that is not a tool result");
        }
        let context = latest.map(Message::content).unwrap_or_default();
        let prompt = format_template(&self.template, &[("question", question), ("context", context)]);

        let grade: GradeDocuments = invoke_typed(self.llm.as_ref(), &[Message::user(prompt)]).await?;
        let relevance = grade.relevance();
        debug!(score = %grade.binary_score, ?relevance, "graded retrieved context");
        Ok(relevance)
    }
}
