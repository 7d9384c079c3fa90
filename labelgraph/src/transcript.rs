//! Append-only conversation transcript: the only state threaded through a graph.
//!
//! Messages can be appended but never edited or removed. A tool result may only be
//! appended while its `tool_call_id` is pending on the most recent assistant message,
//! which keeps requests and results correlated.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::message::{Message, ToolCallRequest};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TranscriptError {
    /// The tool result answers no pending request of the latest assistant message.
    #[error("tool result '{tool_call_id}' does not match a pending tool call")]
    UncorrelatedToolResult { tool_call_id: String },
}

/// Serialized as a bare array of messages. Deserializing replays the array through
/// [`extend`](Transcript::extend), so a stored transcript meets the same checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Message>", into = "Vec<Message>")]
pub struct Transcript {
    messages: Vec<Message>,
}

impl TryFrom<Vec<Message>> for Transcript {
    type Error = TranscriptError;

    fn try_from(messages: Vec<Message>) -> Result<Self, Self::Error> {
        Self::from_messages(messages)
    }
}

impl From<Transcript> for Vec<Message> {
    fn from(transcript: Transcript) -> Self {
        transcript.messages
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a transcript by appending `messages` in order, with the same checks as [`push`](Self::push).
    pub fn from_messages(messages: impl IntoIterator<Item = Message>) -> Result<Self, TranscriptError> {
        let mut t = Self::new();
        t.extend(messages)?;
        Ok(t)
    }

    pub fn push(&mut self, message: Message) -> Result<(), TranscriptError> {
        self.extend(std::iter::once(message))
    }

    /// Appends a batch as one unit: either every message is appended or none is.
    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) -> Result<(), TranscriptError> {
        let batch: Vec<Message> = messages.into_iter().collect();
        let mut pending: HashSet<String> = self
            .pending_tool_calls()
            .into_iter()
            .map(|c| c.id.clone())
            .collect();
        for msg in &batch {
            match msg {
                Message::Assistant { tool_calls, .. } => {
                    pending = tool_calls.iter().map(|c| c.id.clone()).collect();
                }
                Message::Tool { tool_call_id, .. } => {
                    if !pending.remove(tool_call_id) {
                        return Err(TranscriptError::UncorrelatedToolResult {
                            tool_call_id: tool_call_id.clone(),
                        });
                    }
                }
                Message::System { .. } | Message::User { .. } => {}
            }
        }
        self.messages.extend(batch);
        Ok(())
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Content of the first user message: the question a retrieval turn is about.
    pub fn first_user(&self) -> Option<&str> {
        self.messages.iter().find_map(|m| match m {
            Message::User { content } => Some(content.as_str()),
            _ => None,
        })
    }

    fn last_assistant_index(&self) -> Option<usize> {
        self.messages
            .iter()
            .rposition(|m| matches!(m, Message::Assistant { .. }))
    }

    pub fn last_assistant(&self) -> Option<&Message> {
        self.last_assistant_index().map(|i| &self.messages[i])
    }

    /// Requests of the latest assistant message that have no tool result yet, in request order.
    pub fn pending_tool_calls(&self) -> Vec<&ToolCallRequest> {
        let Some(idx) = self.last_assistant_index() else {
            return Vec::new();
        };
        let answered: HashSet<&str> = self.messages[idx + 1..]
            .iter()
            .filter_map(|m| match m {
                Message::Tool { tool_call_id, .. } => Some(tool_call_id.as_str()),
                _ => None,
            })
            .collect();
        self.messages[idx]
            .tool_calls()
            .iter()
            .filter(|c| !answered.contains(c.id.as_str()))
            .collect()
    }

    pub fn has_pending_tool_calls(&self) -> bool {
        !self.pending_tool_calls().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(id: &str) -> ToolCallRequest {
        ToolCallRequest::new(id, "retrieve_bsky_docs", json!({"query": "labels"}))
    }

    /// **Scenario**: pending calls shrink as results arrive, in request order.
    #[test]
    fn pending_tool_calls_track_results() {
        let mut t = Transcript::from_messages([
            Message::user("q"),
            Message::assistant_with_tools("", vec![call("a"), call("b")]),
        ])
        .unwrap();
        let ids: Vec<_> = t.pending_tool_calls().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["a", "b"]);

        t.push(Message::tool("a", "retrieve_bsky_docs", "x")).unwrap();
        let ids: Vec<_> = t.pending_tool_calls().iter().map(|c| c.id.clone()).collect();
        assert_eq!(ids, vec!["b"]);

        t.push(Message::tool("b", "retrieve_bsky_docs", "y")).unwrap();
        assert!(!t.has_pending_tool_calls());
    }

    /// **Scenario**: a tool result with an unknown or repeated id is rejected and nothing is appended.
    #[test]
    fn uncorrelated_tool_result_rejected_atomically() {
        let mut t = Transcript::from_messages([
            Message::user("q"),
            Message::assistant_with_tools("", vec![call("a")]),
        ])
        .unwrap();
        let before = t.clone();

        let err = t
            .extend([
                Message::tool("a", "retrieve_bsky_docs", "ok"),
                Message::tool("a", "retrieve_bsky_docs", "again"),
            ])
            .unwrap_err();
        assert_eq!(
            err,
            TranscriptError::UncorrelatedToolResult {
                tool_call_id: "a".into()
            }
        );
        assert_eq!(t, before);

        assert!(t.push(Message::tool("zzz", "x", "y")).is_err());
    }

    /// **Scenario**: first_user returns the original question even after rewrites.
    #[test]
    fn first_user_is_the_original_question() {
        let t = Transcript::from_messages([
            Message::system("sys"),
            Message::user("original"),
            Message::assistant("..."),
            Message::user("rewritten"),
        ])
        .unwrap();
        assert_eq!(t.first_user(), Some("original"));
    }

    /// **Scenario**: a transcript serializes as a bare JSON array of messages.
    #[test]
    fn serializes_as_array() {
        let t = Transcript::from_messages([Message::user("hi")]).unwrap();
        let v = serde_json::to_value(&t).unwrap();
        assert_eq!(v, json!([{"role": "user", "content": "hi"}]));
        let back: Transcript = serde_json::from_value(v).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn deserializing_rejects_uncorrelated_tool_result() {
        let v = json!([
            {"role": "user", "content": "hi"},
            {"role": "tool", "tool_call_id": "ghost", "name": "retrieve_bsky_docs", "content": "x"}
        ]);
        let err = serde_json::from_value::<Transcript>(v).unwrap_err();
        assert!(err.to_string().contains("ghost"), "{}", err);
    }
}
