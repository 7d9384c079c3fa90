//! OpenAI Chat Completions client implementing `LlmClient`.
//!
//! Uses `OPENAI_API_KEY` (and optionally `OPENAI_BASE_URL`) by default, or an explicit
//! `OpenAIConfig`. Structured output is requested by offering a single function whose
//! parameters are the output schema and requiring the model to call it.
//!
//! **Interaction**: Implements `LlmClient`; used by the model, grade, rewrite and answer
//! nodes like `MockLlm`.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace};

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionMessageToolCall, ChatCompletionMessageToolCalls,
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestToolMessageArgs,
        ChatCompletionRequestUserMessage, ChatCompletionTool, ChatCompletionToolChoiceOption,
        ChatCompletionTools, CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
        FunctionCall, FunctionObject, ToolChoiceOptions,
    },
    Client,
};
use env_config::Settings;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse, LlmUsage, OutputSchema};
use crate::message::{Message, ToolCallRequest};
use crate::tools::ToolSpec;

pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
}

fn invocation(context: &str, e: impl std::fmt::Display) -> AgentError {
    AgentError::ModelInvocation(format!("{}: {}", context, e))
}

impl ChatOpenAI {
    /// Default config: API key from `OPENAI_API_KEY`.
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::default(), model)
    }

    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
        }
    }

    /// Client for `model` using the API key and base URL from `settings`.
    pub fn from_settings(settings: &Settings, model: impl Into<String>) -> Self {
        Self::with_config(openai_config(settings), model)
    }

    /// Lower values are more deterministic (0–2).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn to_request_message(m: &Message) -> Result<ChatCompletionRequestMessage, AgentError> {
        Ok(match m {
            Message::System { content } => ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessage::from(content.as_str()),
            ),
            Message::User { content } => ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessage::from(content.as_str()),
            ),
            Message::Assistant { content, tool_calls } => {
                let mut args = ChatCompletionRequestAssistantMessageArgs::default();
                if !content.is_empty() {
                    args.content(content.as_str());
                }
                if !tool_calls.is_empty() {
                    args.tool_calls(
                        tool_calls
                            .iter()
                            .map(|c| {
                                ChatCompletionMessageToolCalls::Function(ChatCompletionMessageToolCall {
                                    id: c.id.clone(),
                                    function: FunctionCall {
                                        name: c.name.clone(),
                                        arguments: c.arguments.to_string(),
                                    },
                                })
                            })
                            .collect::<Vec<_>>(),
                    );
                }
                args.build()
                    .map_err(|e| invocation("OpenAI request build failed", e))?
                    .into()
            }
            Message::Tool {
                tool_call_id,
                content,
                ..
            } => ChatCompletionRequestToolMessageArgs::default()
                .tool_call_id(tool_call_id.as_str())
                .content(content.as_str())
                .build()
                .map_err(|e| invocation("OpenAI request build failed", e))?
                .into(),
        })
    }

    fn function_tool(name: &str, description: &str, parameters: &Value) -> ChatCompletionTools {
        ChatCompletionTools::Function(ChatCompletionTool {
            function: FunctionObject {
                name: name.to_string(),
                description: Some(description.to_string()),
                parameters: Some(parameters.clone()),
                ..Default::default()
            },
        })
    }

    fn build_request(
        &self,
        messages: &[Message],
        tools: Vec<ChatCompletionTools>,
        require_tool: bool,
    ) -> Result<CreateChatCompletionRequest, AgentError> {
        let request_messages = messages
            .iter()
            .map(Self::to_request_message)
            .collect::<Result<Vec<_>, _>>()?;
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(request_messages);
        if !tools.is_empty() {
            args.tools(tools);
            let mode = if require_tool {
                ToolChoiceOptions::Required
            } else {
                ToolChoiceOptions::Auto
            };
            args.tool_choice(ChatCompletionToolChoiceOption::Mode(mode));
        }
        if let Some(t) = self.temperature {
            args.temperature(t);
        }
        args.build()
            .map_err(|e| invocation("OpenAI request build failed", e))
    }

    async fn complete(&self, request: CreateChatCompletionRequest) -> Result<LlmResponse, AgentError> {
        if let Ok(js) = serde_json::to_string(&request) {
            trace!(model = %self.model, request = %js, "OpenAI request body");
        }
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| invocation("OpenAI API error", e))?;

        let usage = response.usage.as_ref().map(|u| LlmUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::ModelInvocation("OpenAI returned no choices".into()))?;

        let msg = choice.message;
        let mut tool_calls = Vec::new();
        for tc in msg.tool_calls.unwrap_or_default() {
            if let ChatCompletionMessageToolCalls::Function(f) = tc {
                let arguments: Value = if f.function.arguments.trim().is_empty() {
                    Value::Object(Default::default())
                } else {
                    serde_json::from_str(&f.function.arguments).map_err(|e| {
                        invocation(&format!("tool call '{}' has invalid JSON arguments", f.function.name), e)
                    })?
                };
                tool_calls.push(ToolCallRequest::new(f.id, f.function.name, arguments));
            }
        }
        debug!(
            model = %self.model,
            tool_calls = tool_calls.len(),
            usage = ?usage,
            "OpenAI chat complete"
        );
        Ok(LlmResponse {
            content: msg.content.unwrap_or_default(),
            tool_calls,
            usage,
        })
    }
}

/// `OpenAIConfig` with the API key and base URL from `settings` when present.
pub(crate) fn openai_config(settings: &Settings) -> OpenAIConfig {
    let mut config = OpenAIConfig::new();
    if let Some(key) = &settings.openai_api_key {
        config = config.with_api_key(key);
    }
    if let Some(base) = &settings.openai_base_url {
        config = config.with_api_base(base);
    }
    config
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message], tools: &[ToolSpec]) -> Result<LlmResponse, AgentError> {
        let chat_tools = tools
            .iter()
            .map(|t| Self::function_tool(&t.name, t.description.as_deref().unwrap_or(""), &t.input_schema))
            .collect();
        debug!(
            model = %self.model,
            message_count = messages.len(),
            tools_count = tools.len(),
            "OpenAI chat create"
        );
        let request = self.build_request(messages, chat_tools, false)?;
        self.complete(request).await
    }

    async fn invoke_structured(
        &self,
        messages: &[Message],
        schema: &OutputSchema,
    ) -> Result<Value, AgentError> {
        let tool = Self::function_tool(&schema.name, &schema.description, &schema.schema);
        let request = self.build_request(messages, vec![tool], true)?;
        let response = self.complete(request).await?;
        response
            .tool_calls
            .into_iter()
            .find(|c| c.name == schema.name)
            .map(|c| c.arguments)
            .ok_or_else(|| {
                AgentError::ModelInvocation(format!(
                    "model did not return structured output '{}'",
                    schema.name
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// **Scenario**: every transcript role converts to a request message without error.
    #[test]
    fn converts_all_roles() {
        let messages = vec![
            Message::system("s"),
            Message::user("u"),
            Message::assistant_with_tools(
                "",
                vec![ToolCallRequest::new("c1", "get_label", json!({"identifier": "spam"}))],
            ),
            Message::tool("c1", "get_label", "{}"),
            Message::assistant("done"),
        ];
        for m in &messages {
            assert!(ChatOpenAI::to_request_message(m).is_ok(), "{:?}", m);
        }
    }

    /// **Scenario**: a structured request offers exactly one tool and requires it.
    #[test]
    fn structured_request_requires_single_tool() {
        let llm = ChatOpenAI::with_config(OpenAIConfig::new().with_api_key("test"), "gpt-test");
        let tool = ChatOpenAI::function_tool("grade", "binary", &json!({"type": "object"}));
        let req = llm.build_request(&[Message::user("q")], vec![tool], true).unwrap();
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["model"], "gpt-test");
        assert_eq!(v["tools"].as_array().map(Vec::len), Some(1));
        assert_eq!(v["tool_choice"], "required");
    }

    #[test]
    fn settings_feed_openai_config() {
        let settings = Settings::from_lookup(|k| match k {
            "OPENAI_API_KEY" => Some("sk-test".into()),
            "OPENAI_BASE_URL" => Some("http://localhost:9999/v1".into()),
            _ => None,
        })
        .unwrap();
        let llm = ChatOpenAI::from_settings(&settings, settings.chat_model.clone());
        assert_eq!(llm.model(), env_config::DEFAULT_CHAT_MODEL);
    }
}
