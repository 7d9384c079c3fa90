//! Structured logging for graph execution.

use crate::error::AgentError;

pub fn log_graph_start(entry: &str, thread_id: Option<&str>) {
    tracing::info!(entry, thread_id, "graph run start");
}

pub fn log_node_start(node_id: &str, invocation: usize, transcript_len: usize) {
    tracing::debug!(node_id, invocation, transcript_len, "node start");
}

pub fn log_node_complete(node_id: &str, appended: usize) {
    tracing::debug!(node_id, appended, "node complete");
}

pub fn log_route(from: &str, key: Option<&str>, to: &str) {
    tracing::debug!(from, key, to, "route");
}

pub fn log_graph_complete(steps: usize, transcript_len: usize) {
    tracing::info!(steps, transcript_len, "graph run complete");
}

pub fn log_graph_error(error: &AgentError) {
    tracing::error!(%error, "graph run failed");
}
