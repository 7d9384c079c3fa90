//! Scripted LLM for tests and offline runs.
//!
//! Responses are consumed in order from two queues: one for `invoke`, one for
//! `invoke_structured`. When a queue is empty its fallback (if any) is returned,
//! otherwise the call fails with `ModelInvocation`. Every request is recorded.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, OutputSchema};
use crate::message::{Message, ToolCallRequest};
use crate::tools::ToolSpec;

/// One recorded call: the messages sent and the names of the tools (or schema) offered.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub messages: Vec<Message>,
    pub tools: Vec<String>,
}

#[derive(Default)]
struct Script {
    responses: VecDeque<LlmResponse>,
    fallback: Option<LlmResponse>,
    structured: VecDeque<Value>,
    structured_fallback: Option<Value>,
    calls: Vec<RecordedCall>,
}

/// **Interaction**: Implements `LlmClient`; used wherever `ChatOpenAI` would be.
#[derive(Default)]
pub struct MockLlm {
    script: Mutex<Script>,
}

fn lock(m: &Mutex<Script>) -> MutexGuard<'_, Script> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}

impl MockLlm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mock that returns `responses` in order.
    pub fn scripted(responses: impl IntoIterator<Item = LlmResponse>) -> Self {
        let mock = Self::new();
        lock(&mock.script).responses.extend(responses);
        mock
    }

    /// First call requests `tool_calls`; every later call answers `final_text` with no tools.
    pub fn first_tools_then_end(tool_calls: Vec<ToolCallRequest>, final_text: impl Into<String>) -> Self {
        Self::scripted([LlmResponse::with_tool_calls(tool_calls)])
            .with_fallback(LlmResponse::text(final_text))
    }

    /// Response used once the `invoke` queue is empty.
    pub fn with_fallback(self, response: LlmResponse) -> Self {
        lock(&self.script).fallback = Some(response);
        self
    }

    /// Queues structured results (e.g. `{"binary_score": "yes"}`).
    pub fn with_structured(self, values: impl IntoIterator<Item = Value>) -> Self {
        lock(&self.script).structured.extend(values);
        self
    }

    /// Structured result used once the structured queue is empty.
    pub fn with_structured_fallback(self, value: Value) -> Self {
        lock(&self.script).structured_fallback = Some(value);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.script).calls.clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.script).calls.len()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<LlmResponse, AgentError> {
        let mut script = lock(&self.script);
        script.calls.push(RecordedCall {
            messages: messages.to_vec(),
            tools: tools.iter().map(|t| t.name.clone()).collect(),
        });
        match script.responses.pop_front() {
            Some(r) => Ok(r),
            None => script
                .fallback
                .clone()
                .ok_or_else(|| AgentError::ModelInvocation("mock script exhausted".into())),
        }
    }

    async fn invoke_structured(
        &self,
        messages: &[Message],
        schema: &OutputSchema,
    ) -> Result<Value, AgentError> {
        let mut script = lock(&self.script);
        script.calls.push(RecordedCall {
            messages: messages.to_vec(),
            tools: vec![schema.name.clone()],
        });
        match script.structured.pop_front() {
            Some(v) => Ok(v),
            None => script
                .structured_fallback
                .clone()
                .ok_or_else(|| AgentError::ModelInvocation("mock structured script exhausted".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// **Scenario**: scripted responses come out in order, then the fallback repeats.
    #[tokio::test]
    async fn scripted_then_fallback() {
        let llm = MockLlm::scripted([LlmResponse::text("one")]).with_fallback(LlmResponse::text("again"));
        assert_eq!(llm.invoke(&[], &[]).await.unwrap().content, "one");
        assert_eq!(llm.invoke(&[], &[]).await.unwrap().content, "again");
        assert_eq!(llm.invoke(&[], &[]).await.unwrap().content, "again");
        assert_eq!(llm.call_count(), 3);
    }

    /// **Scenario**: an exhausted script without fallback is a ModelInvocation error.
    #[tokio::test]
    async fn exhausted_script_errors() {
        let llm = MockLlm::new();
        assert!(matches!(
            llm.invoke(&[Message::user("q")], &[]).await,
            Err(AgentError::ModelInvocation(_))
        ));
        let schema = OutputSchema {
            name: "s".into(),
            description: String::new(),
            schema: json!({}),
        };
        assert!(llm.invoke_structured(&[], &schema).await.is_err());
        assert_eq!(llm.calls()[0].messages, vec![Message::user("q")]);
    }
}
