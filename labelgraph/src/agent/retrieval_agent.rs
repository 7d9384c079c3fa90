//! Retrieval agent: the model decides whether to retrieve; retrieved context is graded
//! and either answered from or used to rewrite the question.
//!
//! ```text
//! START -> agent -(Act)-> retrieve -(Relevant)-> generate_answer -> END
//!                |                 -(NotRelevant)-> rewrite_question -> agent
//!                -(Stop)-> END
//! ```

use std::sync::Arc;

use crate::graph::{Router, StateGraph, END};
use crate::llm::LlmClient;
use crate::prompts::AgentPrompts;
use crate::tools::ToolRegistry;

use super::{
    tools_router, AnswerNode, GradeRouter, ModelNode, Relevance, RewriteNode, ToolNode,
    ToolsCondition,
};

pub const NODE_AGENT: &str = "agent";
pub const NODE_RETRIEVE: &str = "retrieve";
pub const NODE_REWRITE_QUESTION: &str = "rewrite_question";
pub const NODE_GENERATE_ANSWER: &str = "generate_answer";

/// Collaborators of the retrieval agent. The grader may be a smaller model than the
/// one answering.
pub struct RetrievalAgentParts {
    pub response_llm: Arc<dyn LlmClient>,
    pub grader_llm: Arc<dyn LlmClient>,
    /// Retriever tool plus any extra tools (e.g. web search).
    pub tools: ToolRegistry,
    pub prompts: AgentPrompts,
}

pub fn build_retrieval_agent(parts: RetrievalAgentParts) -> StateGraph {
    let RetrievalAgentParts {
        response_llm,
        grader_llm,
        tools,
        prompts,
    } = parts;

    let model = ModelNode::new(Arc::clone(&response_llm))
        .with_system_prompt(prompts.retrieval_system.clone())
        .with_tools(tools.clone());

    let grader: Arc<dyn Router<Relevance>> =
        Arc::new(GradeRouter::new(grader_llm, prompts.grade.clone()));

    let mut graph = StateGraph::new();
    graph
        .add_node(NODE_AGENT, Arc::new(model))
        .add_node(NODE_RETRIEVE, Arc::new(ToolNode::new(tools)))
        .add_node(
            NODE_REWRITE_QUESTION,
            Arc::new(RewriteNode::new(Arc::clone(&response_llm), prompts.rewrite.clone())),
        )
        .add_node(
            NODE_GENERATE_ANSWER,
            Arc::new(AnswerNode::new(response_llm, prompts.generate.clone())),
        )
        .set_entry_point(NODE_AGENT)
        .add_conditional_edges(
            NODE_AGENT,
            tools_router(),
            [
                (ToolsCondition::Act, NODE_RETRIEVE.to_string()),
                (ToolsCondition::Stop, END.to_string()),
            ]
            .into(),
        )
        .add_conditional_edges(
            NODE_RETRIEVE,
            grader,
            [
                (Relevance::Relevant, NODE_GENERATE_ANSWER.to_string()),
                (Relevance::NotRelevant, NODE_REWRITE_QUESTION.to_string()),
            ]
            .into(),
        )
        .add_edge(NODE_REWRITE_QUESTION, NODE_AGENT)
        .add_edge(NODE_GENERATE_ANSWER, END);
    graph
}
