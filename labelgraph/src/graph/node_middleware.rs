//! Node middleware: wrap each node invocation with external async logic (around pattern).

use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::error::AgentError;
use crate::message::Message;

/// The not-yet-polled node invocation handed to middleware.
pub type NodeFuture<'a> = BoxFuture<'a, Result<Vec<Message>, AgentError>>;

/// Wraps node execution; set with `StateGraph::with_middleware`.
///
/// Implementations must await `inner` exactly once to execute the node (or return
/// an error without running it).
#[async_trait]
pub trait NodeMiddleware: Send + Sync {
    async fn around_run<'a>(
        &'a self,
        node_id: &'a str,
        inner: NodeFuture<'a>,
    ) -> Result<Vec<Message>, AgentError>;
}
