//! Answer generation for the retrieval agent.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::graph::Node;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::prompts::format_template;
use crate::transcript::Transcript;

/// Generates the final answer from the first user question and the latest message
/// (the retrieved context). Appends one assistant message.
pub struct AnswerNode {
    llm: Arc<dyn LlmClient>,
    template: String,
}

impl AnswerNode {
    /// `template` uses `{question}` and `{context}`.
    pub fn new(llm: Arc<dyn LlmClient>, template: impl Into<String>) -> Self {
        Self {
            llm,
            template: template.into(),
        }
    }
}

#[async_trait]
impl Node for AnswerNode {
    async fn run(&self, transcript: &Transcript) -> Result<Vec<Message>, AgentError> {
        let question = transcript.first_user().unwrap_or_default();
        let context = transcript.last().map(Message::content).unwrap_or_default();
        let prompt = format_template(&self.template, &[("question", question), ("context", context)]);
        let response = self.llm.invoke(&[Message::user(prompt)], &[]).await?;
        Ok(vec![Message::assistant(response.content)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmResponse, MockLlm};

    #[tokio::test]
    async fn answer_uses_question_and_latest_context() {
        let llm = Arc::new(MockLlm::scripted([LlmResponse::text("Labelers label things.")]));
        let node = AnswerNode::new(llm.clone(), "{question}|{context}");
        let transcript =
            Transcript::from_messages([Message::user("what?"), Message::assistant("ctx")]).unwrap();
        let out = node.run(&transcript).await.unwrap();
        assert_eq!(out, vec![Message::assistant("Labelers label things.")]);
        assert_eq!(llm.calls()[0].messages, vec![Message::user("what?|ctx")]);
        assert!(llm.calls()[0].tools.is_empty());
    }
}
