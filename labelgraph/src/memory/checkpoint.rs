//! Checkpoint: one saved transcript snapshot for a thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::transcript::Transcript;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: String,
    pub thread_id: String,
    /// 1-based sequence number within the thread; the highest step is the latest.
    pub step: u64,
    pub created_at: DateTime<Utc>,
    pub transcript: Transcript,
}

impl Checkpoint {
    pub fn new(thread_id: impl Into<String>, step: u64, transcript: Transcript) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            thread_id: thread_id.into(),
            step,
            created_at: Utc::now(),
            transcript,
        }
    }

    pub fn list_item(&self) -> CheckpointListItem {
        CheckpointListItem {
            id: self.id.clone(),
            step: self.step,
            created_at: self.created_at,
            message_count: self.transcript.len(),
        }
    }
}

/// Summary row returned by `Checkpointer::list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckpointListItem {
    pub id: String,
    pub step: u64,
    pub created_at: DateTime<Utc>,
    pub message_count: usize,
}
