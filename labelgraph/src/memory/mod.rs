//! Cross-turn persistence of transcripts, keyed by thread id.
//!
//! - [`Checkpointer`]: save / load / list checkpoints for a thread.
//! - [`MemorySaver`]: in-process, for tests and one-shot CLI sessions.
//! - [`SqliteSaver`]: persistent across process restarts.

mod checkpoint;
mod checkpointer;
mod memory_saver;
mod sqlite_saver;

pub use checkpoint::{Checkpoint, CheckpointListItem};
pub use checkpointer::{CheckpointError, Checkpointer};
pub use memory_saver::MemorySaver;
pub use sqlite_saver::SqliteSaver;
