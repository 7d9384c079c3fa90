//! Events emitted by `CompiledStateGraph::stream`.

use serde::Serialize;

use crate::message::Message;
use crate::transcript::Transcript;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A node finished; `messages` is the batch it appended.
    NodeOutput { node: String, messages: Vec<Message> },
    /// The interpreter chose the next node. `key` is the route key for conditional edges.
    Routed {
        from: String,
        key: Option<String>,
        to: String,
    },
    /// The run reached END.
    Finished { transcript: Transcript },
}
