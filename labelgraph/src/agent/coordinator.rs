//! Coordinator (supervisor) agent.
//!
//! A tool agent whose two tools each run a sub-agent in a fresh transcript:
//!
//! | Tool | Sub-agent | Sub-agent tools |
//! |------|-----------|-----------------|
//! | `retrieve_additional_context(query)` | researcher | `retrieve_bsky_docs` (k = 2) |
//! | `provide_feedback_on_label(request)` | feedback | `get_label`, `create_label` |
//!
//! Labels created by the feedback agent land in the shared [`LabelBook`].

use std::sync::Arc;

use crate::graph::{CompilationError, RunConfig, StateGraph};
use crate::labels::{CreateLabelTool, GetLabelTool, LabelBook};
use crate::llm::LlmClient;
use crate::prompts::AgentPrompts;
use crate::retrieval::Retriever;
use crate::tools::{AgentTool, ApprovalPolicy, RetrieverTool, ToolRegistry};

use super::build_tool_agent;

pub const TOOL_RETRIEVE_ADDITIONAL_CONTEXT: &str = "retrieve_additional_context";
pub const TOOL_PROVIDE_FEEDBACK_ON_LABEL: &str = "provide_feedback_on_label";

const RESEARCHER_K: usize = 2;

pub struct CoordinatorParts {
    /// Model for the coordinator itself.
    pub llm: Arc<dyn LlmClient>,
    /// Model for the researcher and feedback sub-agents.
    pub sub_agent_llm: Arc<dyn LlmClient>,
    pub retriever: Arc<dyn Retriever>,
    pub labels: LabelBook,
    /// Tools of the feedback agent that need human approval (typically `create_label`).
    pub approval: Option<ApprovalPolicy>,
    pub prompts: AgentPrompts,
    /// Run options for each sub-agent call.
    pub sub_agent_config: RunConfig,
}

/// Researcher sub-agent: answers a query from the knowledge base.
pub fn build_researcher_agent(
    llm: Arc<dyn LlmClient>,
    retriever: Arc<dyn Retriever>,
    prompts: &AgentPrompts,
) -> StateGraph {
    let tools = ToolRegistry::new()
        .with(Arc::new(RetrieverTool::bsky_docs(retriever).with_k(RESEARCHER_K)));
    build_tool_agent(llm, Some(&prompts.researcher_system), tools)
}

/// Feedback sub-agent: reviews and creates label definitions in `labels`.
pub fn build_feedback_agent(
    llm: Arc<dyn LlmClient>,
    labels: LabelBook,
    approval: Option<&ApprovalPolicy>,
    prompts: &AgentPrompts,
) -> StateGraph {
    let mut tools = ToolRegistry::new()
        .with(Arc::new(GetLabelTool::new(labels.clone())))
        .with(Arc::new(CreateLabelTool::new(labels)));
    if let Some(policy) = approval {
        tools = policy.apply(tools);
    }
    build_tool_agent(llm, Some(&prompts.feedback_system), tools)
}

/// Builds the uncompiled coordinator graph; the sub-agents are compiled here.
pub fn build_coordinator(parts: CoordinatorParts) -> Result<StateGraph, CompilationError> {
    let CoordinatorParts {
        llm,
        sub_agent_llm,
        retriever,
        labels,
        approval,
        prompts,
        sub_agent_config,
    } = parts;

    let researcher =
        build_researcher_agent(Arc::clone(&sub_agent_llm), retriever, &prompts).compile()?;
    let feedback =
        build_feedback_agent(sub_agent_llm, labels, approval.as_ref(), &prompts).compile()?;

    let tools = ToolRegistry::new()
        .with(Arc::new(
            AgentTool::new(
                TOOL_RETRIEVE_ADDITIONAL_CONTEXT,
                "Retrieve additional context about Bluesky labelers for the user's query. \
                 Use this when you lack information about Bluesky. \
                 Input: a natural language query (e.g. 'what are Bluesky labelers?').",
                "query",
                researcher,
            )
            .with_config(sub_agent_config.clone()),
        ))
        .with(Arc::new(
            AgentTool::new(
                TOOL_PROVIDE_FEEDBACK_ON_LABEL,
                "Interpret what label the user wants and give feedback on the proposed \
                 configuration before saving it. Use this when the user wants to create, \
                 modify, or get feedback on a label. Input: a natural language request \
                 (e.g. 'i want a label for posts that show misinformation').",
                "request",
                feedback,
            )
            .with_config(sub_agent_config),
        ));

    Ok(build_tool_agent(
        llm,
        Some(&prompts.coordinator_system_prompt()),
        tools,
    ))
}
