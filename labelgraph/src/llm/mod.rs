//! Model invocation port.
//!
//! Nodes talk to the language model only through [`LlmClient`]: plain turns with
//! optional tool specs ([`LlmClient::invoke`]) and schema-constrained output
//! ([`LlmClient::invoke_structured`], typed via [`invoke_typed`]).
//!
//! Implementations: [`ChatOpenAI`] (OpenAI Chat Completions) and [`MockLlm`] (scripted,
//! for tests and offline demos).

mod mock;
mod openai;
mod structured;

pub use mock::{MockLlm, RecordedCall};
pub use openai::ChatOpenAI;
pub(crate) use openai::openai_config;
pub use structured::{invoke_typed, OutputSchema, StructuredOutput};

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::{Message, ToolCallRequest};
use crate::tools::ToolSpec;

/// Token usage for one call.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LlmUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One assistant turn: text plus zero or more tool-call requests.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LlmResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCallRequest>,
    pub usage: Option<LlmUsage>,
}

impl LlmResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolCallRequest>) -> Self {
        Self {
            tool_calls,
            ..Self::default()
        }
    }

    pub fn into_message(self) -> Message {
        Message::assistant_with_tools(self.content, self.tool_calls)
    }
}

/// Language model collaborator.
///
/// Failures (unreachable service, malformed output) are reported as
/// `AgentError::ModelInvocation` and are not retried by the graph.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One turn over `messages`. `tools` declares what the model may request; pass an
    /// empty slice for a text-only turn.
    async fn invoke(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<LlmResponse, AgentError>;

    /// One turn constrained to `schema`; returns the JSON object the model produced.
    async fn invoke_structured(
        &self,
        messages: &[Message],
        schema: &OutputSchema,
    ) -> Result<serde_json::Value, AgentError>;
}
