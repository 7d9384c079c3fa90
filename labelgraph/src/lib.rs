//! # labelgraph
//!
//! Conversational agents that help people brainstorm and configure labelers for the
//! Bluesky social app, built on a small graph interpreter over an append-only message
//! transcript.
//!
//! ## Design principles
//!
//! - **One state type**: every graph threads a [`Transcript`]; nodes return the messages
//!   to append and never edit earlier ones.
//! - **Typed routing**: conditional edges route on enums ([`ToolsCondition`],
//!   [`Relevance`]) and compilation proves every variant has a target.
//! - **Bounded runs**: a per-node step budget and an optional deadline
//!   ([`RunConfig`]) end runaway rewrite loops with [`AgentError::StepBudgetExceeded`].
//! - **Injected collaborators**: models ([`LlmClient`]), retrievers ([`Retriever`]) and
//!   tools ([`Tool`]) are trait objects passed to constructors.
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Router`],
//!   middleware, visualization.
//! - [`agent`]: model, tool, grade, rewrite and answer steps; the tool agent, retrieval
//!   agent and coordinator builders.
//! - [`llm`]: [`LlmClient`], [`ChatOpenAI`], [`MockLlm`], structured output.
//! - [`tools`]: [`Tool`], [`ToolRegistry`], retriever / web search / sub-agent tools,
//!   approval.
//! - [`retrieval`]: documents, splitter, embedders, [`InMemoryVectorStore`].
//! - [`labels`]: label definitions, [`LabelBook`], labeler service record export.
//! - [`memory`]: [`Checkpointer`], [`MemorySaver`], [`SqliteSaver`].
//! - [`prompts`]: embedded YAML prompts with directory overrides.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use labelgraph::{build_tool_agent, LlmResponse, Message, MockLlm, RunConfig, ToolRegistry};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let llm = Arc::new(MockLlm::scripted([LlmResponse::text("Hello!")]));
//! let graph = build_tool_agent(llm, Some("Be brief."), ToolRegistry::new()).compile()?;
//! let transcript = graph.run(vec![Message::user("hi")], &RunConfig::default()).await?;
//! assert_eq!(transcript.last().map(|m| m.content()), Some("Hello!"));
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod error;
pub mod graph;
pub mod labels;
pub mod llm;
pub mod memory;
pub mod message;
pub mod prompts;
pub mod retrieval;
pub mod stream;
pub mod tools;
pub mod transcript;

pub use agent::{
    build_coordinator, build_retrieval_agent, build_tool_agent, tools_condition, AnswerNode,
    CoordinatorParts, GradeDocuments, GradeRouter, ModelNode, Relevance, RetrievalAgentParts,
    RewriteNode, ToolNode, ToolsCondition,
};
pub use error::{AgentError, BudgetKind};
pub use graph::{
    generate_dot, generate_text, CompilationError, CompiledStateGraph, FnRouter,
    LoggingNodeMiddleware, Node, NodeMiddleware, RouteKey, Router, RunConfig, StateGraph,
    DEFAULT_STEP_BUDGET, END, START,
};
pub use labels::{LabelBook, LabelValueDefinition, LabelerServiceRecord, Locale};
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, MockLlm, OutputSchema, StructuredOutput};
pub use memory::{Checkpoint, CheckpointError, Checkpointer, MemorySaver, SqliteSaver};
pub use message::{Message, ToolCallRequest};
pub use prompts::AgentPrompts;
pub use retrieval::{Document, Embedder, InMemoryVectorStore, RetrievalError, Retriever};
pub use stream::StreamEvent;
pub use tools::{Tool, ToolCallContent, ToolRegistry, ToolSourceError, ToolSpec};
pub use transcript::{Transcript, TranscriptError};
