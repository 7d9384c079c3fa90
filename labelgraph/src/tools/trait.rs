use async_trait::async_trait;
use serde_json::Value;

use super::{ToolCallContent, ToolSourceError, ToolSpec};

/// A single callable tool.
///
/// Tools are registered in a [`ToolRegistry`](super::ToolRegistry); the model node
/// advertises their [`spec`](Tool::spec) and the tool node dispatches calls by
/// [`name`](Tool::name).
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name within a registry; must equal `spec().name`.
    fn name(&self) -> &str;

    fn spec(&self) -> ToolSpec;

    /// Runs the tool with the model-provided JSON arguments.
    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError>;
}
