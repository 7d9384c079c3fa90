//! Tool node: executes the tool calls of the latest assistant message.

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::graph::Node;
use crate::message::Message;
use crate::tools::ToolRegistry;
use crate::transcript::Transcript;

/// Result text for a call to a tool that is not registered.
pub const UNKNOWN_TOOL_RESULT: &str = "bad tool name, retry";

/// Runs every pending call sequentially, in request order, and returns one tool-result
/// message per call with the matching id. Unknown tools and tool errors become result
/// text for the model; this node only fails on transcript faults.
pub struct ToolNode {
    tools: ToolRegistry,
}

impl ToolNode {
    pub fn new(tools: ToolRegistry) -> Self {
        Self { tools }
    }
}

fn truncate_for_log(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    }
}

#[async_trait]
impl Node for ToolNode {
    async fn run(&self, transcript: &Transcript) -> Result<Vec<Message>, AgentError> {
        let calls = transcript.pending_tool_calls();
        let mut results = Vec::with_capacity(calls.len());
        for call in calls {
            let content = match self.tools.get(&call.name) {
                None => {
                    warn!(tool = %call.name, id = %call.id, "unknown tool requested");
                    UNKNOWN_TOOL_RESULT.to_string()
                }
                Some(tool) => match tool.call(call.arguments.clone()).await {
                    Ok(out) => out.text,
                    Err(e) => {
                        debug!(tool = %call.name, error = %e, "tool call failed");
                        format!("Error: {}\n Please fix your mistakes.", e)
                    }
                },
            };
            debug!(
                tool = %call.name,
                id = %call.id,
                result = %truncate_for_log(&content, 120),
                "tool call finished"
            );
            results.push(Message::tool(call.id.clone(), call.name.clone(), content));
        }
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ToolCallRequest;
    use crate::tools::{Tool, ToolCallContent, ToolSourceError, ToolSpec};
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct Failing;

    #[async_trait]
    impl Tool for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "failing".into(),
                description: None,
                input_schema: json!({}),
            }
        }
        async fn call(&self, _args: Value) -> Result<ToolCallContent, ToolSourceError> {
            Err(ToolSourceError::Execution("disk on fire".into()))
        }
    }

    /// **Scenario**: unknown tools and failing tools both produce in-band results.
    #[tokio::test]
    async fn unknown_and_failing_tools_are_in_band() {
        let node = ToolNode::new(ToolRegistry::new().with(Arc::new(Failing)));
        let transcript = Transcript::from_messages([
            Message::user("go"),
            Message::assistant_with_tools(
                "",
                vec![
                    ToolCallRequest::new("c1", "nope", json!({})),
                    ToolCallRequest::new("c2", "failing", json!({})),
                ],
            ),
        ])
        .unwrap();

        let out = node.run(&transcript).await.unwrap();
        assert_eq!(
            out,
            vec![
                Message::tool("c1", "nope", "bad tool name, retry"),
                Message::tool(
                    "c2",
                    "failing",
                    "Error: execution failed: disk on fire\n Please fix your mistakes."
                ),
            ]
        );
    }

    #[tokio::test]
    async fn no_pending_calls_returns_nothing() {
        let node = ToolNode::new(ToolRegistry::new());
        let transcript = Transcript::from_messages([Message::user("hi")]).unwrap();
        assert!(node.run(&transcript).await.unwrap().is_empty());
    }
}
