//! Question rewriting after an irrelevant retrieval.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::Node;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::prompts::format_template;
use crate::transcript::Transcript;

/// Asks the model to reformulate the first user question and appends the result as a
/// new user message.
pub struct RewriteNode {
    llm: Arc<dyn LlmClient>,
    template: String,
}

impl RewriteNode {
    /// `template` uses `{question}`.
    pub fn new(llm: Arc<dyn LlmClient>, template: impl Into<String>) -> Self {
        Self {
            llm,
            template: template.into(),
        }
    }
}

#[async_trait]
impl Node for RewriteNode {
    async fn run(&self, transcript: &Transcript) -> Result<Vec<Message>, AgentError> {
        let question = transcript.first_user().unwrap_or_default();
        let prompt = format_template(&self.template, &[("question", question)]);
        let response = self.llm.invoke(&[Message::user(prompt)], &[]).await?;
        tracing::debug!(rewritten = %response.content, "question rewritten");
        Ok(vec![Message::user(response.content)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmResponse, MockLlm};

    /// **Scenario**: the rewrite is based on the first user question, not the latest message.
    #[tokio::test]
    async fn appends_one_user_message_from_first_question() {
        let llm = Arc::new(MockLlm::scripted([LlmResponse::text("What do labelers blur?")]));
        let node = RewriteNode::new(llm.clone(), "Improve: {question}");
        let transcript = Transcript::from_messages([
            Message::user("blur?"),
            Message::assistant("thinking"),
            Message::user("an earlier rewrite"),
        ])
        .unwrap();

        let out = node.run(&transcript).await.unwrap();
        assert_eq!(out, vec![Message::user("What do labelers blur?")]);

        let calls = llm.calls();
        assert_eq!(calls[0].messages, vec![Message::user("Improve: blur?")]);
        assert!(calls[0].tools.is_empty());
    }
}
