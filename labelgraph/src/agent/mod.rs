//! Agent nodes, routers and the graphs built from them.
//!
//! | Piece | Kind | Appends |
//! |-------|------|---------|
//! | [`ModelNode`] | node | one assistant message |
//! | [`ToolNode`] | node | one tool result per pending call |
//! | [`RewriteNode`] | node | one user message |
//! | [`AnswerNode`] | node | one assistant message |
//! | [`tools_condition`] | router | nothing; [`ToolsCondition`] |
//! | [`GradeRouter`] | router | nothing; [`Relevance`] |
//!
//! Builders: [`build_tool_agent`], [`build_retrieval_agent`], [`build_coordinator`].

mod answer;
mod condition;
mod coordinator;
mod grade;
mod model_node;
mod retrieval_agent;
mod rewrite;
mod tool_agent;
mod tool_node;

pub use answer::AnswerNode;
pub use condition::{tools_condition, tools_router, ToolsCondition};
pub use coordinator::{
    build_coordinator, build_feedback_agent, build_researcher_agent, CoordinatorParts,
    TOOL_PROVIDE_FEEDBACK_ON_LABEL, TOOL_RETRIEVE_ADDITIONAL_CONTEXT,
};
pub use grade::{GradeDocuments, GradeRouter, Relevance};
pub use model_node::ModelNode;
pub use retrieval_agent::{
    build_retrieval_agent, RetrievalAgentParts, NODE_AGENT, NODE_GENERATE_ANSWER,
    NODE_RETRIEVE, NODE_REWRITE_QUESTION,
};
pub use rewrite::RewriteNode;
pub use tool_agent::{build_tool_agent, NODE_ACTION, NODE_LLM_CALL};
pub use tool_node::{ToolNode, UNKNOWN_TOOL_RESULT};
