//! Shared tracing subscriber for the CLI.
//!
//! Console output goes to stderr filtered by `RUST_LOG` (default `warn`, or
//! `labelgraph=debug` when verbose). When a log directory is given, a daily-rotated
//! plain-text file layer is added as well.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "labelgraph.log";

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("warn,labelgraph=debug")
        } else {
            EnvFilter::new("warn")
        }
    })
}

/// Installs the global subscriber. Keep the returned guard alive for the life of the
/// process so buffered file logs are flushed on exit.
pub fn init(verbose: bool, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>, std::io::Error> {
    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(filter(verbose));

    let Some(dir) = log_dir else {
        let _ = tracing_subscriber::registry().with(console).try_init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_filter(filter(verbose));
    let _ = tracing_subscriber::registry().with(console).with(file).try_init();
    Ok(Some(guard))
}
