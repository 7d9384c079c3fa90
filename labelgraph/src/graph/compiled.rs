//! Compiled state graph: immutable, cheap to clone, runs a transcript to END.
//!
//! Built by `StateGraph::compile` or `compile_with_checkpointer`. The run loop
//! invokes one node at a time, appends its batch to the transcript, then follows the
//! node's fixed edge or asks its router for the next node.
//!
//! Invariants enforced per step:
//! - a node is entered at most `RunConfig::step_budget` times per run;
//! - if tool calls were pending when a node started, that node must answer all of them;
//! - a run never ends with tool calls pending;
//! - a streamed run stops before the next node once its receiver is dropped.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::{AgentError, BudgetKind};
use crate::memory::Checkpointer;
use crate::message::Message;
use crate::stream::StreamEvent;
use crate::transcript::Transcript;

use super::logging::{
    log_graph_complete, log_graph_error, log_graph_start, log_node_complete, log_node_start,
    log_route,
};
use super::node::Node;
use super::node_middleware::NodeMiddleware;
use super::route::ConditionalEdge;
use super::run_config::RunConfig;
use super::state_graph::END;

const STREAM_BUFFER: usize = 64;

#[derive(Clone)]
pub(crate) enum NextEntry {
    Fixed(String),
    Conditional(Arc<dyn ConditionalEdge>),
}

pub(crate) struct GraphInner {
    pub nodes: HashMap<String, Arc<dyn Node>>,
    pub entry: String,
    pub next_map: HashMap<String, NextEntry>,
    pub checkpointer: Option<Arc<dyn Checkpointer>>,
    pub middleware: Option<Arc<dyn NodeMiddleware>>,
}

/// Executable graph. Clones share the same nodes and collaborators.
#[derive(Clone)]
pub struct CompiledStateGraph {
    pub(super) inner: Arc<GraphInner>,
}

impl std::fmt::Debug for CompiledStateGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut nodes: Vec<&String> = self.inner.nodes.keys().collect();
        nodes.sort();
        f.debug_struct("CompiledStateGraph")
            .field("entry", &self.inner.entry)
            .field("nodes", &nodes)
            .field("checkpointer", &self.inner.checkpointer.is_some())
            .finish()
    }
}

type EventSender = mpsc::Sender<Result<StreamEvent, AgentError>>;

impl CompiledStateGraph {
    pub(crate) fn from_inner(inner: GraphInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn entry(&self) -> &str {
        &self.inner.entry
    }

    /// Node ids, sorted.
    pub fn node_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.inner.nodes.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Runs one turn: `input` is appended to the thread's saved transcript (or to an
    /// empty one), the graph runs to END, and the final transcript is returned.
    ///
    /// With a checkpointer and `config.thread_id`, the final transcript is saved only
    /// when the run succeeds; a failed turn leaves the previous checkpoint untouched.
    pub async fn run(&self, input: Vec<Message>, config: &RunConfig) -> Result<Transcript, AgentError> {
        self.run_with_events(input, config, None).await
    }

    /// Streaming variant of [`run`](Self::run). Events arrive as nodes complete; a
    /// failure is yielded as the final `Err` item.
    pub fn stream(
        &self,
        input: Vec<Message>,
        config: RunConfig,
    ) -> ReceiverStream<Result<StreamEvent, AgentError>> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let graph = self.clone();
        tokio::spawn(async move {
            let result = graph.run_with_events(input, &config, Some(&tx)).await;
            if matches!(result, Err(AgentError::Cancelled { .. })) {
                return;
            }
            let last = result.map(|transcript| StreamEvent::Finished { transcript });
            if tx.send(last).await.is_err() {
                tracing::debug!("stream consumer dropped before the final event");
            }
        });
        ReceiverStream::new(rx)
    }

    async fn run_with_events(
        &self,
        input: Vec<Message>,
        config: &RunConfig,
        events: Option<&EventSender>,
    ) -> Result<Transcript, AgentError> {
        let mut transcript = self.load_thread(config).await?;
        transcript.extend(input)?;

        match self.run_loop(&mut transcript, config, events).await {
            Ok(()) => {}
            Err(e @ AgentError::Cancelled { .. }) => {
                tracing::debug!(error = %e, "graph run cancelled");
                return Err(e);
            }
            Err(e) => {
                log_graph_error(&e);
                return Err(e);
            }
        }

        if let (Some(cp), Some(thread_id)) = (&self.inner.checkpointer, &config.thread_id) {
            cp.put(thread_id, &transcript).await?;
        }
        Ok(transcript)
    }

    async fn load_thread(&self, config: &RunConfig) -> Result<Transcript, AgentError> {
        match (&self.inner.checkpointer, &config.thread_id) {
            (Some(cp), Some(thread_id)) => Ok(cp
                .get(thread_id)
                .await?
                .map(|c| c.transcript)
                .unwrap_or_default()),
            _ => Ok(Transcript::new()),
        }
    }

    fn resolve_entry(&self, config: &RunConfig) -> Result<String, AgentError> {
        match &config.entry {
            Some(id) if self.inner.nodes.contains_key(id) => Ok(id.clone()),
            Some(id) => Err(AgentError::ExecutionFailed(format!(
                "entry node not found: {}",
                id
            ))),
            None => Ok(self.inner.entry.clone()),
        }
    }

    async fn invoke_node(
        &self,
        node_id: &str,
        node: &Arc<dyn Node>,
        transcript: &Transcript,
    ) -> Result<Vec<Message>, AgentError> {
        match &self.inner.middleware {
            Some(m) => m.around_run(node_id, node.run(transcript)).await,
            None => node.run(transcript).await,
        }
    }

    async fn run_loop(
        &self,
        transcript: &mut Transcript,
        config: &RunConfig,
        events: Option<&EventSender>,
    ) -> Result<(), AgentError> {
        let started = Instant::now();
        let mut current = self.resolve_entry(config)?;
        let mut invocations: HashMap<String, usize> = HashMap::new();
        let mut steps = 0usize;
        log_graph_start(&current, config.thread_id.as_deref());

        loop {
            if events.is_some_and(|tx| tx.is_closed()) {
                return Err(AgentError::Cancelled { node: current });
            }
            if let Some(deadline) = config.deadline {
                if started.elapsed() > deadline {
                    return Err(AgentError::StepBudgetExceeded {
                        node: current,
                        budget: config.step_budget,
                        kind: BudgetKind::Deadline,
                    });
                }
            }
            let count = invocations.entry(current.clone()).or_default();
            if *count >= config.step_budget {
                return Err(AgentError::StepBudgetExceeded {
                    node: current,
                    budget: config.step_budget,
                    kind: BudgetKind::Steps,
                });
            }
            *count += 1;
            steps += 1;

            let node = self
                .inner
                .nodes
                .get(&current)
                .ok_or_else(|| AgentError::ExecutionFailed(format!("node not found: {}", current)))?;

            let pending_before: Vec<String> = transcript
                .pending_tool_calls()
                .into_iter()
                .map(|c| c.id.clone())
                .collect();

            log_node_start(&current, *count, transcript.len());
            let output = self.invoke_node(&current, node, transcript).await?;

            if !pending_before.is_empty() {
                let answered: HashSet<&str> = output
                    .iter()
                    .filter_map(|m| match m {
                        Message::Tool { tool_call_id, .. } => Some(tool_call_id.as_str()),
                        _ => None,
                    })
                    .collect();
                let ids: Vec<String> = pending_before
                    .into_iter()
                    .filter(|id| !answered.contains(id.as_str()))
                    .collect();
                if !ids.is_empty() {
                    return Err(AgentError::UnresolvedToolCalls { node: current, ids });
                }
            }

            transcript.extend(output.iter().cloned())?;
            log_node_complete(&current, output.len());
            emit(
                events,
                &current,
                StreamEvent::NodeOutput {
                    node: current.clone(),
                    messages: output,
                },
            )
            .await?;

            let entry = self.inner.next_map.get(&current).ok_or_else(|| {
                AgentError::ExecutionFailed(format!("no outgoing edge for node: {}", current))
            })?;
            let (key, next) = match entry {
                NextEntry::Fixed(to) => (None, to.clone()),
                NextEntry::Conditional(edge) => {
                    let d = edge.decide(&current, transcript).await?;
                    (Some(d.key), d.target)
                }
            };
            log_route(&current, key.as_deref(), &next);
            emit(
                events,
                &current,
                StreamEvent::Routed {
                    from: current.clone(),
                    key,
                    to: next.clone(),
                },
            )
            .await?;

            if next == END {
                let ids: Vec<String> = transcript
                    .pending_tool_calls()
                    .into_iter()
                    .map(|c| c.id.clone())
                    .collect();
                if !ids.is_empty() {
                    return Err(AgentError::UnresolvedToolCalls { node: current, ids });
                }
                log_graph_complete(steps, transcript.len());
                return Ok(());
            }
            current = next;
        }
    }
}

/// Sends `event` when streaming. A closed channel cancels the run.
async fn emit(events: Option<&EventSender>, node: &str, event: StreamEvent) -> Result<(), AgentError> {
    match events {
        Some(tx) => tx.send(Ok(event)).await.map_err(|_| AgentError::Cancelled {
            node: node.to_string(),
        }),
        None => Ok(()),
    }
}
