//! Building the selected agent and running one turn of it.

use std::error::Error as StdError;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::Settings;
use futures::StreamExt;
use labelgraph::agent::{build_coordinator, build_retrieval_agent, build_tool_agent, CoordinatorParts};
use labelgraph::retrieval::{HashEmbedder, OpenAIEmbedder};
use labelgraph::tools::{
    ApprovalHandler, ApprovalPolicy, AutoApprove, RetrieverTool, TavilySearchTool,
};
use labelgraph::{
    AgentError, AgentPrompts, ChatOpenAI, CheckpointError, Checkpointer, CompilationError,
    CompiledStateGraph, Embedder, LabelBook, LabelerServiceRecord, LlmClient,
    LoggingNodeMiddleware, MemorySaver, Message, RetrievalError, RunConfig, SqliteSaver,
    StateGraph, StreamEvent, ToolRegistry,
};
use thiserror::Error;

use crate::approval::TerminalApproval;
use crate::input::SharedLines;
use crate::knowledge::build_knowledge_base;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("agent turn failed")]
    Agent(#[from] AgentError),
    #[error("building the agent graph failed")]
    Compile(#[from] CompilationError),
    #[error("building the knowledge base failed")]
    Retrieval(#[from] RetrievalError),
    #[error("opening the checkpoint store failed")]
    Checkpoint(#[from] CheckpointError),
    #[error("writing {path}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serializing the labeler record failed")]
    Json(#[from] serde_json::Error),
    #[error("the run ended without a transcript")]
    NoTranscript,
}

/// Which graph to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AgentKind {
    Chat,
    Retrieve,
    Coordinator,
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            AgentKind::Chat => "chat",
            AgentKind::Retrieve => "retrieve",
            AgentKind::Coordinator => "coordinator",
        })
    }
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub kind: AgentKind,
    /// Directory indexed for `retrieve_bsky_docs`.
    pub docs: Option<PathBuf>,
    /// Source tree indexed for `retrieve_source_code` (chat and retrieve only).
    pub source: Option<PathBuf>,
    /// File extensions loaded from `docs` and `source`; empty means the defaults.
    pub extensions: Vec<String>,
    /// SQLite checkpoint file; threads live in memory when unset.
    pub checkpoint_db: Option<PathBuf>,
    /// Ask on the terminal before `create_label` runs (coordinator only).
    pub confirm_labels: bool,
    /// Where approval answers are read; the REPL reads from the same input.
    pub input: SharedLines,
    /// Log every node enter/exit.
    pub verbose: bool,
}

/// A compiled agent plus the label book it writes to (coordinator only).
pub struct Agent {
    pub graph: CompiledStateGraph,
    pub labels: Option<LabelBook>,
}

fn embedder(settings: &Settings) -> Arc<dyn Embedder> {
    if settings.openai_api_key.is_some() {
        Arc::new(OpenAIEmbedder::from_settings(settings))
    } else {
        tracing::warn!("OPENAI_API_KEY not set; using the local hash embedder for retrieval");
        Arc::new(HashEmbedder::default())
    }
}

fn checkpointer(path: Option<&Path>) -> Result<Arc<dyn Checkpointer>, RunError> {
    let saver: Arc<dyn Checkpointer> = match path {
        Some(path) => Arc::new(SqliteSaver::new(path)?),
        None => Arc::new(MemorySaver::new()),
    };
    Ok(saver)
}

/// `retrieve_bsky_docs` over `docs` and `retrieve_source_code` over `source`. With
/// `need_one`, an empty docs tool stands in when neither directory is set.
async fn retriever_tools(
    embedder: Arc<dyn Embedder>,
    opts: &BuildOptions,
    need_one: bool,
) -> Result<ToolRegistry, RunError> {
    let mut tools = ToolRegistry::new();
    if opts.docs.is_some() || (need_one && opts.source.is_none()) {
        let docs =
            build_knowledge_base(Arc::clone(&embedder), opts.docs.as_deref(), &opts.extensions)
                .await?;
        tools.register(Arc::new(RetrieverTool::bsky_docs(Arc::new(docs))));
    }
    if let Some(dir) = opts.source.as_deref() {
        let code = build_knowledge_base(embedder, Some(dir), &opts.extensions).await?;
        tools.register(Arc::new(RetrieverTool::source_code(Arc::new(code))));
    }
    Ok(tools)
}

pub async fn build_agent(
    settings: &Settings,
    prompts: AgentPrompts,
    opts: &BuildOptions,
) -> Result<Agent, RunError> {
    let llm: Arc<dyn LlmClient> =
        Arc::new(ChatOpenAI::from_settings(settings, settings.chat_model.clone()));
    let embedder = embedder(settings);

    let mut labels = None;
    let graph: StateGraph = match opts.kind {
        AgentKind::Chat => {
            let mut tools = retriever_tools(embedder, opts, false).await?;
            if let Some(search) = TavilySearchTool::from_settings(settings) {
                tools.register(Arc::new(search));
            }
            build_tool_agent(llm, Some(&prompts.tool_agent_system), tools)
        }
        AgentKind::Retrieve => {
            let grader: Arc<dyn LlmClient> = Arc::new(
                ChatOpenAI::from_settings(settings, settings.grader_model.clone())
                    .with_temperature(0.0),
            );
            let mut tools = retriever_tools(embedder, opts, true).await?;
            if let Some(search) = TavilySearchTool::from_settings(settings) {
                tools.register(Arc::new(search));
            }
            build_retrieval_agent(labelgraph::RetrievalAgentParts {
                response_llm: llm,
                grader_llm: grader,
                tools,
                prompts,
            })
        }
        AgentKind::Coordinator => {
            let store = Arc::new(
                build_knowledge_base(embedder, opts.docs.as_deref(), &opts.extensions).await?,
            );
            let book = LabelBook::new();
            let handler: Arc<dyn ApprovalHandler> = if opts.confirm_labels {
                Arc::new(TerminalApproval::new(opts.input.clone()))
            } else {
                Arc::new(AutoApprove)
            };
            labels = Some(book.clone());
            build_coordinator(CoordinatorParts {
                llm: Arc::clone(&llm),
                sub_agent_llm: llm,
                retriever: store,
                labels: book,
                approval: Some(ApprovalPolicy::new(
                    [labelgraph::labels::TOOL_CREATE_LABEL],
                    handler,
                )),
                prompts,
                sub_agent_config: RunConfig::default().with_step_budget(settings.step_budget),
            })?
        }
    };

    let graph = if opts.verbose {
        graph.with_middleware(Arc::new(LoggingNodeMiddleware))
    } else {
        graph
    };
    let graph = graph.compile_with_checkpointer(checkpointer(opts.checkpoint_db.as_deref())?)?;
    Ok(Agent { graph, labels })
}

fn show_progress(event: &StreamEvent, verbose: bool) {
    match event {
        StreamEvent::NodeOutput { node, messages } => {
            for message in messages {
                let calls = message.tool_calls();
                if !calls.is_empty() {
                    let names: Vec<&str> = calls.iter().map(|c| c.name.as_str()).collect();
                    eprintln!("tools: {}", names.join(", "));
                } else if verbose {
                    eprintln!("[{}] {}: {} chars", node, message.role(), message.content().len());
                }
            }
        }
        StreamEvent::Routed { from, key, to } if verbose => match key {
            Some(key) => eprintln!("{} -[{}]-> {}", from, key, to),
            None => eprintln!("{} -> {}", from, to),
        },
        _ => {}
    }
}

/// Runs one user turn and returns the reply text: the last assistant message.
pub async fn run_turn(
    graph: &CompiledStateGraph,
    message: &str,
    config: &RunConfig,
    verbose: bool,
) -> Result<String, RunError> {
    let mut events = graph.stream(vec![Message::user(message)], config.clone());
    let mut transcript = None;
    while let Some(event) = events.next().await {
        let event = event?;
        show_progress(&event, verbose);
        if let StreamEvent::Finished { transcript: t } = event {
            transcript = Some(t);
        }
    }
    let transcript = transcript.ok_or(RunError::NoTranscript)?;
    Ok(transcript
        .last_assistant()
        .map(|m| m.content().to_string())
        .unwrap_or_default())
}

/// Writes the `app.bsky.labeler.service` record for every label in `labels`.
pub async fn export_labels(labels: &LabelBook, path: &Path) -> Result<usize, RunError> {
    let record = LabelerServiceRecord::from_book(labels).await;
    let json = record.to_json_pretty()?;
    std::fs::write(path, json).map_err(|source| RunError::Export {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(record.policies.label_values.len())
}

/// Prints `error: ...` followed by each cause on its own line.
pub fn report_error(error: &dyn StdError) {
    eprintln!("error: {}", error);
    let mut source = error.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {}", cause);
        source = cause.source();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelgraph::labels::{Blurs, LabelValueDefinition, Locale};
    use labelgraph::prompts::default_from_embedded;
    use labelgraph::{LlmResponse, MockLlm, ToolCallRequest};

    fn settings() -> Settings {
        Settings::from_lookup(|_| None).unwrap()
    }

    fn opts(kind: AgentKind) -> BuildOptions {
        BuildOptions {
            kind,
            docs: None,
            source: None,
            extensions: vec![],
            checkpoint_db: None,
            confirm_labels: false,
            input: SharedLines::new(tokio::io::empty()),
            verbose: false,
        }
    }

    /// **Scenario**: each kind builds the expected graph without touching the network.
    #[tokio::test]
    async fn builds_each_kind() {
        let chat = build_agent(&settings(), default_from_embedded(), &opts(AgentKind::Chat))
            .await
            .unwrap();
        assert_eq!(chat.graph.node_ids(), vec!["action", "llm_call"]);
        assert!(chat.labels.is_none());

        let retrieve =
            build_agent(&settings(), default_from_embedded(), &opts(AgentKind::Retrieve))
                .await
                .unwrap();
        assert_eq!(
            retrieve.graph.node_ids(),
            vec!["agent", "generate_answer", "retrieve", "rewrite_question"]
        );

        let coordinator =
            build_agent(&settings(), default_from_embedded(), &opts(AgentKind::Coordinator))
                .await
                .unwrap();
        assert!(coordinator.labels.is_some());
    }

    /// **Scenario**: `--source` adds `retrieve_source_code`; retrieve always gets a retriever.
    #[tokio::test]
    async fn retriever_tools_follow_docs_and_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("labeler.ts"), "export const labels = [];").unwrap();
        let embedder = || -> Arc<dyn Embedder> { Arc::new(HashEmbedder::default()) };

        let mut chat = opts(AgentKind::Chat);
        assert!(retriever_tools(embedder(), &chat, false).await.unwrap().names().is_empty());
        chat.source = Some(dir.path().to_path_buf());
        let tools = retriever_tools(embedder(), &chat, false).await.unwrap();
        assert_eq!(tools.names(), vec!["retrieve_source_code"]);

        let retrieve = opts(AgentKind::Retrieve);
        let tools = retriever_tools(embedder(), &retrieve, true).await.unwrap();
        assert_eq!(tools.names(), vec!["retrieve_bsky_docs"]);

        let mut both = opts(AgentKind::Retrieve);
        both.docs = Some(dir.path().to_path_buf());
        both.source = Some(dir.path().to_path_buf());
        let tools = retriever_tools(embedder(), &both, true).await.unwrap();
        assert_eq!(tools.names(), vec!["retrieve_bsky_docs", "retrieve_source_code"]);
    }

    /// **Scenario**: the reply is the final assistant message after the tool loop.
    #[tokio::test]
    async fn run_turn_returns_last_assistant_reply() {
        let llm = Arc::new(
            MockLlm::scripted([LlmResponse::with_tool_calls(vec![ToolCallRequest::new(
                "c1",
                "missing_tool",
                serde_json::json!({}),
            )])])
            .with_fallback(LlmResponse::text("final answer")),
        );
        let graph = build_tool_agent(llm, None, ToolRegistry::new()).compile().unwrap();
        let reply = run_turn(&graph, "hi", &RunConfig::default(), false).await.unwrap();
        assert_eq!(reply, "final answer");
    }

    #[tokio::test]
    async fn run_turn_surfaces_budget_error() {
        let llm = Arc::new(MockLlm::new().with_fallback(LlmResponse::with_tool_calls(vec![
            ToolCallRequest::new("c1", "missing_tool", serde_json::json!({})),
        ])));
        let graph = build_tool_agent(llm, None, ToolRegistry::new()).compile().unwrap();
        let err = run_turn(&graph, "hi", &RunConfig::default().with_step_budget(2), false)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RunError::Agent(AgentError::StepBudgetExceeded { .. })
        ));
    }

    #[tokio::test]
    async fn export_writes_labeler_record() {
        let book = LabelBook::new();
        let mut spider = LabelValueDefinition::new("spider", Locale::new("Spider Warning"));
        spider.blurs = Blurs::Media;
        book.insert(spider).await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labeler.json");
        assert_eq!(export_labels(&book, &path).await.unwrap(), 1);

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["$type"], "app.bsky.labeler.service");
        assert_eq!(written["policies"]["labelValues"][0], "spider");
    }
}
