//! Checkpointer trait and CheckpointError.

use async_trait::async_trait;

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem};
use crate::transcript::Transcript;

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("thread_id required")]
    ThreadIdRequired,
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("storage: {0}")]
    Storage(String),
}

/// Saves and loads transcripts per thread.
///
/// **Interaction**: Injected via `StateGraph::compile_with_checkpointer`;
/// `CompiledStateGraph::run` loads the latest checkpoint before a turn and saves
/// after a successful one when `RunConfig::thread_id` is set.
#[async_trait]
pub trait Checkpointer: Send + Sync {
    /// Stores a new checkpoint for the thread and returns it.
    async fn put(&self, thread_id: &str, transcript: &Transcript) -> Result<Checkpoint, CheckpointError>;

    /// Latest checkpoint for the thread, if any.
    async fn get(&self, thread_id: &str) -> Result<Option<Checkpoint>, CheckpointError>;

    /// Checkpoints for the thread, newest first.
    async fn list(
        &self,
        thread_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError>;
}

pub(crate) fn require_thread_id(thread_id: &str) -> Result<(), CheckpointError> {
    if thread_id.trim().is_empty() {
        Err(CheckpointError::ThreadIdRequired)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display of each CheckpointError variant contains expected keywords.
    #[test]
    fn checkpoint_error_display_all_variants() {
        assert!(CheckpointError::ThreadIdRequired.to_string().contains("thread"));
        assert!(CheckpointError::Serialization("e".into())
            .to_string()
            .contains("serialization"));
        assert!(CheckpointError::Storage("io".into()).to_string().contains("storage"));
    }

    #[test]
    fn blank_thread_id_rejected() {
        assert!(matches!(
            require_thread_id("  "),
            Err(CheckpointError::ThreadIdRequired)
        ));
        assert!(require_thread_id("t1").is_ok());
    }
}
