//! Graph node trait: one step over the transcript.

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;
use crate::transcript::Transcript;

/// One step in a graph: reads the transcript, returns the messages to append.
///
/// The returned batch is appended as one unit. A node never sees a partially applied
/// batch from another node. Returning an empty batch is allowed (e.g. a pass-through).
///
/// **Interaction**: Registered with `StateGraph::add_node`; invoked by the run loop of
/// `CompiledStateGraph`, optionally through a `NodeMiddleware`.
#[async_trait]
pub trait Node: Send + Sync {
    async fn run(&self, transcript: &Transcript) -> Result<Vec<Message>, AgentError>;
}
