//! `labelgraph` binary: brainstorm Bluesky labelers with LLM agents from the terminal.
//!
//! Subcommands: `chat` (tool agent), `retrieve` (graded RAG over docs or a source tree),
//! `coordinator` (supervisor with researcher and feedback sub-agents) and `graph`
//! (print an agent's graph as text or DOT).

mod repl;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use cli::{
    build_agent, export_labels, report_error, run_turn, Agent, AgentKind, BuildOptions, RunError,
    SharedLines,
};
use config::Settings;
use labelgraph::{generate_dot, generate_text, RunConfig};
use repl::run_repl_loop;

#[derive(Parser, Debug)]
#[command(name = "labelgraph")]
#[command(about = "labelgraph: brainstorm and configure Bluesky labelers with LLM agents")]
struct Args {
    #[command(subcommand)]
    cmd: Command,

    /// Verbose: log node enter/exit and routing decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Interactive REPL: after the first reply, keep reading messages from stdin
    #[arg(short, long, global = true)]
    interactive: bool,

    /// Thread ID for conversation continuity (checkpointer)
    #[arg(long, value_name = "ID", global = true)]
    thread_id: Option<String>,

    /// Max invocations of any one node per turn (default: LABELGRAPH_STEP_BUDGET or 25)
    #[arg(long, value_name = "N", global = true)]
    step_budget: Option<usize>,

    /// SQLite file for checkpoints; threads survive restarts when set
    #[arg(long, value_name = "PATH", global = true)]
    checkpoint_db: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Tool agent: the model calls web search (and the docs retriever with --docs) until done
    Chat(ChatArgs),
    /// Retrieval agent: retrieve, grade relevance, rewrite the question or answer
    Retrieve(RetrieveArgs),
    /// Coordinator: delegates research and label feedback to sub-agents
    Coordinator(CoordinatorArgs),
    /// Print the graph of an agent
    Graph(GraphArgs),
}

#[derive(clap::Args, Debug, Clone)]
struct DocsArgs {
    /// Comma-separated file extensions to index (default: md,mdx,txt,ts,tsx,js,json)
    #[arg(long, value_delimiter = ',', value_name = "EXT")]
    extensions: Vec<String>,
}

#[derive(clap::Args, Debug, Clone)]
struct ChatArgs {
    /// Directory of Bluesky docs to expose through `retrieve_bsky_docs`
    #[arg(long, value_name = "DIR")]
    docs: Option<PathBuf>,
    /// Source tree to expose through `retrieve_source_code`
    #[arg(long, value_name = "DIR")]
    source: Option<PathBuf>,
    #[command(flatten)]
    docs_args: DocsArgs,
    /// User message
    #[arg(trailing_var_arg = true)]
    message: Vec<String>,
}

#[derive(clap::Args, Debug, Clone)]
#[command(group(clap::ArgGroup::new("corpus").required(true).multiple(true).args(["docs", "source"])))]
struct RetrieveArgs {
    /// Directory of Bluesky docs to index
    #[arg(long, value_name = "DIR")]
    docs: Option<PathBuf>,
    /// Labeler source tree to index
    #[arg(long, value_name = "DIR")]
    source: Option<PathBuf>,
    #[command(flatten)]
    docs_args: DocsArgs,
    /// User message
    #[arg(trailing_var_arg = true)]
    message: Vec<String>,
}

#[derive(clap::Args, Debug, Clone)]
struct CoordinatorArgs {
    /// Directory of Bluesky docs for the researcher
    #[arg(long, value_name = "DIR")]
    docs: Option<PathBuf>,
    #[command(flatten)]
    docs_args: DocsArgs,
    /// Write the app.bsky.labeler.service record here after each turn
    #[arg(long, value_name = "PATH")]
    export: Option<PathBuf>,
    /// Ask before create_label saves a label
    #[arg(long)]
    confirm: bool,
    /// User message
    #[arg(trailing_var_arg = true)]
    message: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GraphFormat {
    Text,
    Dot,
}

#[derive(clap::Args, Debug, Clone)]
struct GraphArgs {
    /// Agent whose graph to print
    #[arg(value_enum)]
    agent: AgentKind,
    #[arg(long, value_enum, default_value = "text")]
    format: GraphFormat,
}

/// Generates a session-unique thread ID for REPL mode when the user does not provide one.
fn generate_repl_thread_id() -> String {
    format!("repl-{}", uuid::Uuid::new_v4())
}

fn build_options(cmd: &Command, args: &Args, input: &SharedLines) -> BuildOptions {
    let base = |kind, docs: Option<PathBuf>, extensions: Vec<String>| BuildOptions {
        kind,
        docs,
        source: None,
        extensions,
        checkpoint_db: args.checkpoint_db.clone(),
        confirm_labels: false,
        input: input.clone(),
        verbose: args.verbose,
    };
    match cmd {
        Command::Chat(a) => BuildOptions {
            source: a.source.clone(),
            ..base(AgentKind::Chat, a.docs.clone(), a.docs_args.extensions.clone())
        },
        Command::Retrieve(a) => BuildOptions {
            source: a.source.clone(),
            ..base(AgentKind::Retrieve, a.docs.clone(), a.docs_args.extensions.clone())
        },
        Command::Coordinator(a) => BuildOptions {
            confirm_labels: a.confirm,
            ..base(
                AgentKind::Coordinator,
                a.docs.clone(),
                a.docs_args.extensions.clone(),
            )
        },
        Command::Graph(a) => base(a.agent, None, vec![]),
    }
}

fn message_of(cmd: &Command) -> Option<String> {
    let words = match cmd {
        Command::Chat(a) => &a.message,
        Command::Retrieve(a) => &a.message,
        Command::Coordinator(a) => &a.message,
        Command::Graph(_) => return None,
    };
    let message = words.join(" ");
    (!message.trim().is_empty()).then_some(message)
}

async fn one_turn(
    agent: &Agent,
    message: &str,
    config: &RunConfig,
    verbose: bool,
    export: Option<&std::path::Path>,
) -> Result<(), RunError> {
    let reply = run_turn(&agent.graph, message, config, verbose).await?;
    println!("{}", reply);
    if let (Some(labels), Some(path)) = (&agent.labels, export) {
        let n = export_labels(labels, path).await?;
        eprintln!("wrote {} label(s) to {}", n, path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = config::load_and_apply("labelgraph", None) {
        eprintln!("labelgraph: config not loaded: {}", e);
    }
    let args = Args::parse();
    let settings = Settings::from_env()?;
    let _log_guard = config::logging::init(args.verbose, settings.log_dir.as_deref())?;

    let prompts = labelgraph::prompts::load_or_default(settings.prompts_dir.as_deref());
    let input = SharedLines::stdin();
    let opts = build_options(&args.cmd, &args, &input);
    let agent = match build_agent(&settings, prompts, &opts).await {
        Ok(agent) => agent,
        Err(e) => {
            report_error(&e);
            std::process::exit(1);
        }
    };

    if let Command::Graph(g) = &args.cmd {
        let rendered = match g.format {
            GraphFormat::Text => generate_text(&agent.graph),
            GraphFormat::Dot => generate_dot(&agent.graph),
        };
        print!("{}", rendered);
        return Ok(());
    }

    let export = match &args.cmd {
        Command::Coordinator(a) => a.export.clone(),
        _ => None,
    };
    let message = message_of(&args.cmd);
    if !args.interactive && message.is_none() {
        eprintln!("labelgraph: provide a message, or use -i for interactive mode");
        std::process::exit(1);
    }

    let mut config =
        RunConfig::default().with_step_budget(args.step_budget.unwrap_or(settings.step_budget));
    config.thread_id = args.thread_id.clone();
    if args.interactive && config.thread_id.is_none() {
        config.thread_id = Some(generate_repl_thread_id());
    }

    if let Some(message) = message {
        if let Err(e) = one_turn(&agent, &message, &config, args.verbose, export.as_deref()).await {
            report_error(&e);
            if !args.interactive {
                std::process::exit(1);
            }
        }
    }
    if args.interactive {
        run_repl_loop(&input, &agent, &config, args.verbose, export.as_deref()).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinator_flags() {
        let args = Args::parse_from([
            "labelgraph",
            "--thread-id",
            "t1",
            "coordinator",
            "--export",
            "out.json",
            "--confirm",
            "make",
            "a",
            "label",
        ]);
        assert_eq!(args.thread_id.as_deref(), Some("t1"));
        assert_eq!(message_of(&args.cmd).as_deref(), Some("make a label"));
        let opts = build_options(&args.cmd, &args, &SharedLines::new(tokio::io::empty()));
        assert_eq!(opts.kind, AgentKind::Coordinator);
        assert!(opts.confirm_labels);
    }

    #[test]
    fn extensions_split_on_commas() {
        let args = Args::parse_from(["labelgraph", "retrieve", "--docs", "d", "--extensions", "md,ts", "q"]);
        let opts = build_options(&args.cmd, &args, &SharedLines::new(tokio::io::empty()));
        assert_eq!(opts.extensions, vec!["md", "ts"]);
        assert_eq!(opts.docs, Some(PathBuf::from("d")));
        assert_eq!(opts.source, None);
    }

    #[test]
    fn retrieve_needs_docs_or_source() {
        let args = Args::parse_from(["labelgraph", "retrieve", "--source", "src", "q"]);
        let opts = build_options(&args.cmd, &args, &SharedLines::new(tokio::io::empty()));
        assert_eq!(opts.source, Some(PathBuf::from("src")));
        assert_eq!(opts.docs, None);

        assert!(Args::try_parse_from(["labelgraph", "retrieve", "q"]).is_err());
    }

    #[test]
    fn graph_takes_agent_and_format() {
        let args = Args::parse_from(["labelgraph", "graph", "retrieve", "--format", "dot"]);
        assert!(matches!(
            args.cmd,
            Command::Graph(GraphArgs { agent: AgentKind::Retrieve, format: GraphFormat::Dot })
        ));
        assert!(message_of(&args.cmd).is_none());
    }
}
