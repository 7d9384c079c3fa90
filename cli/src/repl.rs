//! Interactive REPL: read a line, run one turn, print the reply, repeat until EOF or quit.
//!
//! Every turn uses the same `thread_id`, so the checkpointer carries the conversation.

use std::io::Write;
use std::path::Path;

use cli::{export_labels, report_error, run_turn, Agent, SharedLines};
use labelgraph::RunConfig;

/// Exits on EOF (Ctrl+D) or `quit`/`exit`/`/quit`. A failed turn is reported and the
/// loop continues; the thread keeps its last good checkpoint. `input` is shared with the
/// approval prompt, which reads its answers mid-turn.
pub async fn run_repl_loop(
    input: &SharedLines,
    agent: &Agent,
    config: &RunConfig,
    verbose: bool,
    export: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = match input.next_line().await? {
            None => break,
            Some(s) if s.trim().is_empty() => continue,
            Some(s) if is_quit_command(&s) => break,
            Some(s) => s,
        };

        match run_turn(&agent.graph, &line, config, verbose).await {
            Ok(reply) => println!("{}", reply),
            Err(e) => report_error(&e),
        }
        if let (Some(labels), Some(path)) = (&agent.labels, export) {
            if let Err(e) = export_labels(labels, path).await {
                report_error(&e);
            }
        }
    }

    println!("Bye.");
    Ok(())
}

fn is_quit_command(s: &str) -> bool {
    let lower = s.trim().to_lowercase();
    matches!(lower.as_str(), "quit" | "exit" | "/quit")
}
