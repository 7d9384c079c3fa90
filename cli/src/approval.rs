//! Approval by asking on the terminal.

use async_trait::async_trait;
use labelgraph::tools::ApprovalHandler;
use serde_json::Value;

use crate::input::SharedLines;

/// `y` or `yes`, any case, approves; everything else (including an empty line) rejects.
pub fn parse_approval(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Prints the pending call to stderr and reads one answer line from the input the REPL
/// also reads from. EOF or a read error rejects.
#[derive(Debug, Clone)]
pub struct TerminalApproval {
    input: SharedLines,
}

impl TerminalApproval {
    pub fn new(input: SharedLines) -> Self {
        Self { input }
    }
}

#[async_trait]
impl ApprovalHandler for TerminalApproval {
    async fn approve(&self, tool: &str, args: &Value) -> bool {
        let args = serde_json::to_string_pretty(args).unwrap_or_else(|_| args.to_string());
        eprintln!("\n{} wants to run with:\n{}", tool, args);
        eprint!("Approve? [y/N] ");

        match self.input.next_line().await {
            Ok(Some(line)) => parse_approval(&line),
            Ok(None) => {
                tracing::warn!(tool, "input closed before an answer; rejecting");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "reading approval failed; rejecting");
                false
            }
        }
    }
}
