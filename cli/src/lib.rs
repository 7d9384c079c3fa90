//! Library side of the `labelgraph` binary: builds the agents from [`config::Settings`] and
//! runs one turn at a time, printing progress to stderr.
//!
//! | Kind | Graph |
//! |------|-------|
//! | [`AgentKind::Chat`] | tool agent with web search and (optionally) the docs and source retrievers |
//! | [`AgentKind::Retrieve`] | retrieval agent with relevance grading and question rewrite |
//! | [`AgentKind::Coordinator`] | supervisor over the researcher and feedback sub-agents |

mod approval;
mod input;
mod knowledge;
mod run;

pub use approval::{parse_approval, TerminalApproval};
pub use input::SharedLines;
pub use knowledge::{build_knowledge_base, CHUNK_OVERLAP, CHUNK_SIZE, DEFAULT_EXTENSIONS};
pub use run::{
    build_agent, export_labels, report_error, run_turn, Agent, AgentKind, BuildOptions, RunError,
};
