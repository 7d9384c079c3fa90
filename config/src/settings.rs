//! Typed settings read from the process environment (after [`crate::load_and_apply`]).

use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_STEP_BUDGET: usize = 25;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

/// Runtime settings for the agents and the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    /// Chat model for the agent, rewrite and answer nodes (`LABELGRAPH_MODEL`).
    pub chat_model: String,
    /// Model for relevance grading (`LABELGRAPH_GRADER_MODEL`); falls back to `chat_model`.
    pub grader_model: String,
    pub embedding_model: String,
    pub tavily_api_key: Option<String>,
    /// Per-node invocation budget for one run (`LABELGRAPH_STEP_BUDGET`).
    pub step_budget: usize,
    /// Directory with prompt YAML overriding the embedded prompts (`LABELGRAPH_PROMPTS_DIR`).
    pub prompts_dir: Option<PathBuf>,
    /// When set, the CLI also writes daily-rotated log files here (`LABELGRAPH_LOG_DIR`).
    pub log_dir: Option<PathBuf>,
}

impl Settings {
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let chat_model = get("LABELGRAPH_MODEL").unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
        let grader_model = get("LABELGRAPH_GRADER_MODEL").unwrap_or_else(|| chat_model.clone());
        let step_budget = match get("LABELGRAPH_STEP_BUDGET") {
            None => DEFAULT_STEP_BUDGET,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(SettingsError::InvalidNumber {
                        key: "LABELGRAPH_STEP_BUDGET",
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            openai_api_key: get("OPENAI_API_KEY"),
            openai_base_url: get("OPENAI_BASE_URL"),
            chat_model,
            grader_model,
            embedding_model: get("LABELGRAPH_EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            tavily_api_key: get("TAVILY_API_KEY"),
            step_budget,
            prompts_dir: get("LABELGRAPH_PROMPTS_DIR").map(PathBuf::from),
            log_dir: get("LABELGRAPH_LOG_DIR").map(PathBuf::from),
        })
    }
}
