//! AgentTool: a compiled graph exposed as a tool another agent can call.
//!
//! Each call runs the sub-graph from a fresh transcript holding only the argument as a
//! user message; the tool result is the content of the sub-graph's last message.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::graph::{CompiledStateGraph, RunConfig};
use crate::message::Message;

use super::{required_str, Tool, ToolCallContent, ToolSourceError, ToolSpec};

pub struct AgentTool {
    name: String,
    description: String,
    argument: String,
    graph: CompiledStateGraph,
    config: RunConfig,
}

impl AgentTool {
    /// `argument` is the single string parameter the model fills in (e.g. `query`).
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        argument: impl Into<String>,
        graph: CompiledStateGraph,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            argument: argument.into(),
            graph,
            config: RunConfig::default(),
        }
    }

    /// Run options for the sub-graph. Any thread id is dropped so calls stay independent.
    pub fn with_config(mut self, mut config: RunConfig) -> Self {
        config.thread_id = None;
        self.config = config;
        self
    }
}

#[async_trait]
impl Tool for AgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn spec(&self) -> ToolSpec {
        let mut properties = serde_json::Map::new();
        properties.insert(
            self.argument.clone(),
            json!({
                "type": "string",
                "description": "Full request for the agent; it has no memory of this conversation."
            }),
        );
        ToolSpec {
            name: self.name.clone(),
            description: Some(self.description.clone()),
            input_schema: json!({
                "type": "object",
                "properties": properties,
                "required": [self.argument]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let task = required_str(&args, &self.argument)?;
        tracing::debug!(agent = %self.name, "delegating to sub-agent");
        let transcript = self
            .graph
            .run(vec![Message::user(task)], &self.config)
            .await
            .map_err(|e| ToolSourceError::Execution(e.to_string()))?;
        let reply = transcript
            .last()
            .map(|m| m.content().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "(no reply)".to_string());
        Ok(ToolCallContent::text(reply))
    }
}
