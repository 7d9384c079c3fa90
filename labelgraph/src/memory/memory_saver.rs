//! In-memory checkpointer.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem};
use crate::memory::checkpointer::{require_thread_id, CheckpointError, Checkpointer};
use crate::transcript::Transcript;

/// Keeps every checkpoint of every thread in memory. Lost when the process exits.
#[derive(Debug, Default)]
pub struct MemorySaver {
    threads: DashMap<String, Vec<Checkpoint>>,
}

impl MemorySaver {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Checkpointer for MemorySaver {
    async fn put(&self, thread_id: &str, transcript: &Transcript) -> Result<Checkpoint, CheckpointError> {
        require_thread_id(thread_id)?;
        let mut entry = self.threads.entry(thread_id.to_string()).or_default();
        let step = entry.last().map_or(1, |c| c.step + 1);
        let checkpoint = Checkpoint::new(thread_id, step, transcript.clone());
        entry.push(checkpoint.clone());
        Ok(checkpoint)
    }

    async fn get(&self, thread_id: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        require_thread_id(thread_id)?;
        Ok(self
            .threads
            .get(thread_id)
            .and_then(|list| list.last().cloned()))
    }

    async fn list(
        &self,
        thread_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        require_thread_id(thread_id)?;
        let Some(list) = self.threads.get(thread_id) else {
            return Ok(Vec::new());
        };
        Ok(list
            .iter()
            .rev()
            .take(limit.unwrap_or(usize::MAX))
            .map(Checkpoint::list_item)
            .collect())
    }
}
