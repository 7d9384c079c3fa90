//! Line input shared by the REPL and the approval prompt.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::sync::Mutex;

type BoxedLines = Lines<Box<dyn AsyncBufRead + Send + Unpin>>;

/// One buffered reader behind a lock. Clones read from the same buffer, so a line read
/// by one holder is never seen or dropped by another.
#[derive(Clone)]
pub struct SharedLines {
    inner: Arc<Mutex<BoxedLines>>,
}

impl SharedLines {
    pub fn new(reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        let buffered: Box<dyn AsyncBufRead + Send + Unpin> = Box::new(BufReader::new(reader));
        Self {
            inner: Arc::new(Mutex::new(buffered.lines())),
        }
    }

    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin())
    }

    /// Next line without its newline; `None` at EOF.
    pub async fn next_line(&self) -> std::io::Result<Option<String>> {
        self.inner.lock().await.next_line().await
    }
}

impl std::fmt::Debug for SharedLines {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedLines").finish_non_exhaustive()
    }
}
