//! `tools_condition`: act on tool calls or stop.

use std::sync::Arc;

use crate::graph::{FnRouter, RouteKey, Router};
use crate::message::Message;
use crate::transcript::Transcript;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolsCondition {
    Act,
    Stop,
}

impl RouteKey for ToolsCondition {
    const VARIANTS: &'static [Self] = &[ToolsCondition::Act, ToolsCondition::Stop];
}

/// `Act` when the last message is an assistant message with tool calls, else `Stop`.
pub fn tools_condition(transcript: &Transcript) -> ToolsCondition {
    match transcript.last() {
        Some(Message::Assistant { tool_calls, .. }) if !tool_calls.is_empty() => ToolsCondition::Act,
        _ => ToolsCondition::Stop,
    }
}

pub fn tools_router() -> Arc<dyn Router<ToolsCondition>> {
    Arc::new(FnRouter(tools_condition))
}
