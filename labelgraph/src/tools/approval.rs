//! Human-in-the-loop approval for selected tools.
//!
//! An [`ApprovalPolicy`] names the tools that need confirmation; applying it to a
//! [`ToolRegistry`] wraps each of them in [`RequiresApproval`]. A rejected call is not an
//! error: the model receives `User rejected the call to {tool}` as the tool result.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::{Tool, ToolCallContent, ToolRegistry, ToolSourceError, ToolSpec};

/// Decides whether a pending tool call may run.
#[async_trait]
pub trait ApprovalHandler: Send + Sync {
    async fn approve(&self, tool: &str, args: &Value) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AutoApprove;

#[async_trait]
impl ApprovalHandler for AutoApprove {
    async fn approve(&self, _tool: &str, _args: &Value) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AutoReject;

#[async_trait]
impl ApprovalHandler for AutoReject {
    async fn approve(&self, _tool: &str, _args: &Value) -> bool {
        false
    }
}

/// A tool that asks `handler` before delegating to `inner`.
pub struct RequiresApproval {
    inner: Arc<dyn Tool>,
    handler: Arc<dyn ApprovalHandler>,
}

impl RequiresApproval {
    pub fn new(inner: Arc<dyn Tool>, handler: Arc<dyn ApprovalHandler>) -> Self {
        Self { inner, handler }
    }
}

#[async_trait]
impl Tool for RequiresApproval {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn spec(&self) -> ToolSpec {
        self.inner.spec()
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let name = self.inner.name();
        if self.handler.approve(name, &args).await {
            tracing::debug!(tool = name, "tool call approved");
            self.inner.call(args).await
        } else {
            tracing::info!(tool = name, "tool call rejected");
            Ok(ToolCallContent::text(format!("User rejected the call to {}", name)))
        }
    }
}

/// Tool names that must be approved, and who approves them.
#[derive(Clone)]
pub struct ApprovalPolicy {
    tools: BTreeSet<String>,
    handler: Arc<dyn ApprovalHandler>,
}

impl ApprovalPolicy {
    pub fn new<I, S>(tools: I, handler: Arc<dyn ApprovalHandler>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tools: tools.into_iter().map(Into::into).collect(),
            handler,
        }
    }

    pub fn requires_approval(&self, tool: &str) -> bool {
        self.tools.contains(tool)
    }

    /// Returns a registry with every listed tool wrapped; order is preserved.
    pub fn apply(&self, registry: ToolRegistry) -> ToolRegistry {
        let mut out = ToolRegistry::new();
        for tool in registry.iter() {
            if self.requires_approval(tool.name()) {
                out.register(Arc::new(RequiresApproval::new(
                    Arc::clone(tool),
                    Arc::clone(&self.handler),
                )));
            } else {
                out.register(Arc::clone(tool));
            }
        }
        out
    }
}

impl std::fmt::Debug for ApprovalPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalPolicy")
            .field("tools", &self.tools)
            .finish_non_exhaustive()
    }
}
