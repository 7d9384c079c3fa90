//! Agent execution error types.
//!
//! Every failure that ends a turn surfaces as [`AgentError`]. Recoverable tool problems
//! (unknown tool name, a tool returning an error) never appear here: they are written
//! into the transcript as tool results so the model can correct itself.

use thiserror::Error;

use crate::memory::CheckpointError;
use crate::transcript::TranscriptError;

/// Why a run stopped before reaching `END` on budget grounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetKind {
    /// A node was entered more often than `RunConfig::step_budget` allows.
    Steps,
    /// The wall-clock deadline in `RunConfig::deadline` passed.
    Deadline,
}

impl std::fmt::Display for BudgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetKind::Steps => f.write_str("steps"),
            BudgetKind::Deadline => f.write_str("deadline"),
        }
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    /// The model collaborator was unreachable, failed, or returned a malformed
    /// structured result. Not retried.
    #[error("model invocation failed: {0}")]
    ModelInvocation(String),

    /// A router produced a key with no entry in its path map.
    #[error("routing failed at node '{node}': no edge for key {key}")]
    Routing { node: String, key: String },

    /// The run exceeded its step budget or deadline. The turn fails; the last saved
    /// checkpoint remains valid.
    #[error("budget exceeded ({kind}) at node '{node}' (budget {budget})")]
    StepBudgetExceeded {
        node: String,
        budget: usize,
        kind: BudgetKind,
    },

    /// A node ran while tool calls were pending and did not answer all of them, or the
    /// run reached END with requests unanswered.
    #[error("unresolved tool calls after node '{node}': {ids:?}")]
    UnresolvedToolCalls { node: String, ids: Vec<String> },

    /// A streamed run stopped because its consumer went away. Nothing is saved.
    #[error("run cancelled at node '{node}': stream consumer dropped")]
    Cancelled { node: String },

    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// Anything else (empty graph, sub-agent failure, task join error).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of StepBudgetExceeded names the node, the budget and the kind.
    #[test]
    fn budget_display_mentions_node_and_budget() {
        let err = AgentError::StepBudgetExceeded {
            node: "rewrite_question".into(),
            budget: 3,
            kind: BudgetKind::Steps,
        };
        let s = err.to_string();
        assert!(s.contains("rewrite_question"), "{}", s);
        assert!(s.contains("budget 3"), "{}", s);
        assert!(s.contains("steps"), "{}", s);
    }

    /// **Scenario**: Routing error display contains the offending key.
    #[test]
    fn routing_display_contains_key() {
        let err = AgentError::Routing {
            node: "agent".into(),
            key: "Act".into(),
        };
        assert!(err.to_string().contains("Act"));
    }
}
