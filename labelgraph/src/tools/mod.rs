//! Tools the model may call: the [`Tool`] trait, an ordered [`ToolRegistry`], and the
//! concrete tools used by the labeler agents.
//!
//! | Tool | Name |
//! |------|------|
//! | [`RetrieverTool`] | `retrieve_bsky_docs`, `retrieve_source_code` |
//! | [`TavilySearchTool`] | `tavily_search_results_json` |
//! | [`AgentTool`] | any; runs a compiled sub-graph |
//! | [`RequiresApproval`] | wraps another tool behind an [`ApprovalHandler`] |
//!
//! Label tools (`get_label`, `create_label`) live in [`crate::labels`].

mod agent_tool;
mod approval;
mod registry;
mod retriever;
mod tavily;
mod r#trait;

pub use agent_tool::AgentTool;
pub use approval::{
    ApprovalHandler, ApprovalPolicy, AutoApprove, AutoReject, RequiresApproval,
};
pub use registry::ToolRegistry;
pub use retriever::{RetrieverTool, TOOL_RETRIEVE_BSKY_DOCS, TOOL_RETRIEVE_SOURCE_CODE};
pub use tavily::{TavilySearchTool, TOOL_TAVILY_SEARCH};
pub use r#trait::Tool;

use serde_json::Value;
use thiserror::Error;

/// Name, description and JSON Schema of a tool, as sent to the model.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

/// Text result of a tool call; becomes the content of the tool-result message.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallContent {
    pub text: String,
}

impl ToolCallContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Errors from calling a tool. The tool node turns these into in-band text for the model.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("execution failed: {0}")]
    Execution(String),
}

/// Required string argument `key` from a tool's JSON arguments.
pub(crate) fn required_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, ToolSourceError> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ToolSourceError::InvalidInput(format!("missing required argument: {}", key)))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of each ToolSourceError variant contains expected keywords.
    #[test]
    fn tool_source_error_display_all_variants() {
        let s = ToolSourceError::InvalidInput("bad".into()).to_string();
        assert!(s.contains("invalid arguments") && s.contains("bad"), "{}", s);
        let s = ToolSourceError::Transport("down".into()).to_string();
        assert!(s.contains("transport"), "{}", s);
        let s = ToolSourceError::Execution("boom".into()).to_string();
        assert!(s.contains("boom"), "{}", s);
    }

    #[test]
    fn required_str_reports_missing_key() {
        let args = serde_json::json!({"query": "labels"});
        assert_eq!(required_str(&args, "query").unwrap(), "labels");
        let err = required_str(&args, "request").unwrap_err();
        assert!(err.to_string().contains("request"));
    }
}
