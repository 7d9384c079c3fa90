//! Model node: one LLM turn over the transcript.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AgentError;
use crate::graph::Node;
use crate::llm::LlmClient;
use crate::message::Message;
use crate::tools::ToolRegistry;
use crate::transcript::Transcript;

/// Sends the transcript (prefixed with the system prompt, which is never appended) and
/// the registry's tool specs to the model; appends the single assistant reply.
pub struct ModelNode {
    llm: Arc<dyn LlmClient>,
    system_prompt: Option<String>,
    tools: ToolRegistry,
}

impl ModelNode {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            system_prompt: None,
            tools: ToolRegistry::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }
}

#[async_trait]
impl Node for ModelNode {
    async fn run(&self, transcript: &Transcript) -> Result<Vec<Message>, AgentError> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        if let Some(prompt) = &self.system_prompt {
            messages.push(Message::system(prompt.clone()));
        }
        messages.extend_from_slice(transcript.messages());

        let response = self.llm.invoke(&messages, &self.tools.specs()).await?;
        debug!(
            tool_calls = response.tool_calls.len(),
            content_len = response.content.len(),
            "model replied"
        );
        Ok(vec![response.into_message()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{LlmResponse, MockLlm};

    /// **Scenario**: the system prompt is sent first but not returned for appending.
    #[tokio::test]
    async fn system_prompt_sent_not_persisted() {
        let llm = Arc::new(MockLlm::scripted([LlmResponse::text("hi")]));
        let node = ModelNode::new(llm.clone()).with_system_prompt("be brief");
        let transcript = Transcript::from_messages([Message::user("hello")]).unwrap();

        let out = node.run(&transcript).await.unwrap();
        assert_eq!(out, vec![Message::assistant("hi")]);

        let calls = llm.calls();
        assert_eq!(calls[0].messages[0], Message::system("be brief"));
        assert_eq!(calls[0].messages[1], Message::user("hello"));
    }

    #[tokio::test]
    async fn model_failure_is_model_invocation_error() {
        let node = ModelNode::new(Arc::new(MockLlm::new()));
        let err = node.run(&Transcript::new()).await.unwrap_err();
        assert!(matches!(err, AgentError::ModelInvocation(_)));
    }
}
