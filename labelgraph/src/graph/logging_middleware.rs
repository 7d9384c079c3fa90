//! Middleware that logs node enter/exit with elapsed time.

use std::time::Instant;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;

use super::node_middleware::{NodeFuture, NodeMiddleware};

/// Logs `node enter` / `node exit` at info level around each node run.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingNodeMiddleware;

#[async_trait]
impl NodeMiddleware for LoggingNodeMiddleware {
    async fn around_run<'a>(
        &'a self,
        node_id: &'a str,
        inner: NodeFuture<'a>,
    ) -> Result<Vec<Message>, AgentError> {
        tracing::info!(node = node_id, "node enter");
        let started = Instant::now();
        let result = inner.await;
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(messages) => {
                tracing::info!(node = node_id, appended = messages.len(), elapsed_ms, "node exit")
            }
            Err(e) => tracing::info!(node = node_id, error = %e, elapsed_ms, "node exit"),
        }
        result
    }
}
