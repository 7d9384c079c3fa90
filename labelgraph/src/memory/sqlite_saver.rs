//! SQLite-backed checkpointer. Persistent across process restarts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension};

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem};
use crate::memory::checkpointer::{require_thread_id, CheckpointError, Checkpointer};
use crate::transcript::Transcript;

fn storage(e: impl std::fmt::Display) -> CheckpointError {
    CheckpointError::Storage(e.to_string())
}

fn parse_ts(raw: &str) -> Result<DateTime<Utc>, CheckpointError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CheckpointError::Serialization(e.to_string()))
}

/// SQLite checkpointer. Key: (thread_id, step).
///
/// Each call opens its own connection inside `spawn_blocking`.
///
/// **Interaction**: Used as `Arc<dyn Checkpointer>` in `StateGraph::compile_with_checkpointer`.
pub struct SqliteSaver {
    db_path: PathBuf,
}

impl SqliteSaver {
    /// Opens (or creates) the database and ensures the table exists.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, CheckpointError> {
        let db_path = path.as_ref().to_path_buf();
        let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS checkpoints (
                thread_id TEXT NOT NULL,
                step INTEGER NOT NULL,
                checkpoint_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                message_count INTEGER NOT NULL,
                transcript TEXT NOT NULL,
                PRIMARY KEY (thread_id, step)
            )
            "#,
            [],
        )
        .map_err(storage)?;
        Ok(Self { db_path })
    }
}

#[async_trait]
impl Checkpointer for SqliteSaver {
    async fn put(&self, thread_id: &str, transcript: &Transcript) -> Result<Checkpoint, CheckpointError> {
        require_thread_id(thread_id)?;
        let payload =
            serde_json::to_string(transcript).map_err(|e| CheckpointError::Serialization(e.to_string()))?;
        let thread_id = thread_id.to_string();
        let transcript = transcript.clone();
        let db_path = self.db_path.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            let tx = conn.transaction().map_err(storage)?;
            let last: Option<i64> = tx
                .query_row(
                    "SELECT MAX(step) FROM checkpoints WHERE thread_id = ?1",
                    params![thread_id],
                    |row| row.get(0),
                )
                .map_err(storage)?;
            let step = last.map_or(1, |s| s as u64 + 1);
            let checkpoint = Checkpoint::new(thread_id, step, transcript);
            tx.execute(
                r#"
                INSERT INTO checkpoints
                (thread_id, step, checkpoint_id, created_at, message_count, transcript)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![
                    checkpoint.thread_id,
                    checkpoint.step as i64,
                    checkpoint.id,
                    checkpoint.created_at.to_rfc3339(),
                    checkpoint.transcript.len() as i64,
                    payload,
                ],
            )
            .map_err(storage)?;
            tx.commit().map_err(storage)?;
            Ok::<_, CheckpointError>(checkpoint)
        })
        .await
        .map_err(storage)?
    }

    async fn get(&self, thread_id: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        require_thread_id(thread_id)?;
        let key = thread_id.to_string();
        let db_path = self.db_path.clone();

        type Row = (i64, String, String, String);
        let row: Option<Row> = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            conn.query_row(
                "SELECT step, checkpoint_id, created_at, transcript FROM checkpoints
                 WHERE thread_id = ?1 ORDER BY step DESC LIMIT 1",
                params![key],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
            )
            .optional()
            .map_err(storage)
        })
        .await
        .map_err(storage)??;

        let Some((step, id, created_at, payload)) = row else {
            return Ok(None);
        };
        let transcript: Transcript =
            serde_json::from_str(&payload).map_err(|e| CheckpointError::Serialization(e.to_string()))?;
        Ok(Some(Checkpoint {
            id,
            thread_id: thread_id.to_string(),
            step: step as u64,
            created_at: parse_ts(&created_at)?,
            transcript,
        }))
    }

    async fn list(
        &self,
        thread_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError> {
        require_thread_id(thread_id)?;
        let thread_id = thread_id.to_string();
        let db_path = self.db_path.clone();
        let limit = limit.map_or(-1, |n| n as i64);

        let rows: Vec<(String, i64, String, i64)> = tokio::task::spawn_blocking(move || {
            let conn = rusqlite::Connection::open(&db_path).map_err(storage)?;
            let mut stmt = conn
                .prepare(
                    "SELECT checkpoint_id, step, created_at, message_count FROM checkpoints
                     WHERE thread_id = ?1 ORDER BY step DESC LIMIT ?2",
                )
                .map_err(storage)?;
            let rows = stmt
                .query_map(params![thread_id, limit], |r| {
                    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?))
                })
                .map_err(storage)?
                .collect::<Result<Vec<_>, _>>()
                .map_err(storage)?;
            Ok::<_, CheckpointError>(rows)
        })
        .await
        .map_err(storage)??;

        rows.into_iter()
            .map(|(id, step, created_at, count)| {
                Ok(CheckpointListItem {
                    id,
                    step: step as u64,
                    created_at: parse_ts(&created_at)?,
                    message_count: count as usize,
                })
            })
            .collect()
    }
}
