//! Tool-calling agent: `llm_call` and `action` in a loop until the model stops asking
//! for tools.
//!
//! ```text
//! START -> llm_call -(Act)-> action -> llm_call
//!                   -(Stop)-> END
//! ```

use std::sync::Arc;

use crate::graph::{StateGraph, END};
use crate::llm::LlmClient;
use crate::tools::ToolRegistry;

use super::{tools_router, ModelNode, ToolNode, ToolsCondition};

pub const NODE_LLM_CALL: &str = "llm_call";
pub const NODE_ACTION: &str = "action";

/// Builds the uncompiled tool-agent graph. `system_prompt` is sent on every model call
/// and never stored in the transcript.
pub fn build_tool_agent(
    llm: Arc<dyn LlmClient>,
    system_prompt: Option<&str>,
    tools: ToolRegistry,
) -> StateGraph {
    let mut model = ModelNode::new(llm).with_tools(tools.clone());
    if let Some(p) = system_prompt {
        model = model.with_system_prompt(p);
    }

    let mut graph = StateGraph::new();
    graph
        .add_node(NODE_LLM_CALL, Arc::new(model))
        .add_node(NODE_ACTION, Arc::new(ToolNode::new(tools)))
        .set_entry_point(NODE_LLM_CALL)
        .add_conditional_edges(
            NODE_LLM_CALL,
            tools_router(),
            [
                (ToolsCondition::Act, NODE_ACTION.to_string()),
                (ToolsCondition::Stop, END.to_string()),
            ]
            .into(),
        )
        .add_edge(NODE_ACTION, NODE_LLM_CALL);
    graph
}
