//! Per-run configuration.

use std::time::Duration;

/// Default per-node invocation budget.
pub const DEFAULT_STEP_BUDGET: usize = 25;

/// Options for one `CompiledStateGraph::run` / `stream` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Conversation thread; with a checkpointer, the run resumes from and saves to it.
    pub thread_id: Option<String>,
    /// Maximum number of invocations of any single node in one run. Entering a node
    /// beyond this fails the run with `AgentError::StepBudgetExceeded`.
    pub step_budget: usize,
    /// Start at this node instead of the compiled entry point.
    pub entry: Option<String>,
    /// Wall-clock budget for the whole run, checked between steps.
    pub deadline: Option<Duration>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            thread_id: None,
            step_budget: DEFAULT_STEP_BUDGET,
            entry: None,
            deadline: None,
        }
    }
}

impl RunConfig {
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_step_budget(mut self, step_budget: usize) -> Self {
        self.step_budget = step_budget;
        self
    }

    pub fn with_entry(mut self, node_id: impl Into<String>) -> Self {
        self.entry = Some(node_id.into());
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}
