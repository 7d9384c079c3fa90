//! Load prompts from a directory of YAML files over the embedded defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{AgentPrompts, CoordinatorPromptsFile, RetrievalPromptsFile, ToolAgentPromptsFile};

macro_rules! embed_prompt_yaml {
    ($name:literal) => {
        include_str!(concat!("../../prompts/", $name))
    };
}
const EMBED_RETRIEVAL: &str = embed_prompt_yaml!("retrieval.yaml");
const EMBED_TOOL_AGENT: &str = embed_prompt_yaml!("tool_agent.yaml");
const EMBED_COORDINATOR: &str = embed_prompt_yaml!("coordinator.yaml");

const RETRIEVAL_FILE: &str = "retrieval.yaml";
const TOOL_AGENT_FILE: &str = "tool_agent.yaml";
const COORDINATOR_FILE: &str = "coordinator.yaml";

const PROMPTS_DIR_ENV: &str = "LABELGRAPH_PROMPTS_DIR";
const DEFAULT_PROMPTS_DIR: &str = "prompts";

#[derive(Debug, thiserror::Error)]
pub enum PromptsLoadError {
    #[error("prompts directory not found or not readable: {0}")]
    DirNotFound(String),
    #[error("failed to read prompts file {path}: {message}")]
    ReadFile { path: String, message: String },
    #[error("failed to parse YAML in {path}: {message}")]
    ParseYaml { path: String, message: String },
}

/// `dir`, else `LABELGRAPH_PROMPTS_DIR`, else `./prompts`.
fn prompts_dir(dir: Option<&Path>) -> PathBuf {
    dir.map(PathBuf::from).unwrap_or_else(|| {
        std::env::var(PROMPTS_DIR_ENV)
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPTS_DIR))
    })
}

fn read_yaml_file<T>(dir: &Path, name: &str) -> Result<Option<T>, PromptsLoadError>
where
    T: for<'de> Deserialize<'de>,
{
    let path = dir.join(name);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(PromptsLoadError::ReadFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        }
    };
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| PromptsLoadError::ParseYaml {
            path: path.display().to_string(),
            message: e.to_string(),
        })
}

/// Default prompts parsed from the embedded YAML.
pub fn default_from_embedded() -> AgentPrompts {
    let mut prompts = AgentPrompts::default();
    prompts.apply_retrieval(serde_yaml::from_str(EMBED_RETRIEVAL).unwrap_or_default());
    prompts.apply_tool_agent(serde_yaml::from_str(EMBED_TOOL_AGENT).unwrap_or_default());
    prompts.apply_coordinator(serde_yaml::from_str(EMBED_COORDINATOR).unwrap_or_default());
    prompts
}

/// Embedded defaults overlaid with the fields present in `retrieval.yaml`,
/// `tool_agent.yaml` and `coordinator.yaml` under the prompts directory. Missing files
/// are skipped; a missing directory or unparsable file is an error.
pub fn load(dir: Option<&Path>) -> Result<AgentPrompts, PromptsLoadError> {
    let base = prompts_dir(dir);
    if !base.is_dir() {
        return Err(PromptsLoadError::DirNotFound(base.display().to_string()));
    }
    let mut prompts = default_from_embedded();
    if let Some(f) = read_yaml_file::<RetrievalPromptsFile>(&base, RETRIEVAL_FILE)? {
        prompts.apply_retrieval(f);
    }
    if let Some(f) = read_yaml_file::<ToolAgentPromptsFile>(&base, TOOL_AGENT_FILE)? {
        prompts.apply_tool_agent(f);
    }
    if let Some(f) = read_yaml_file::<CoordinatorPromptsFile>(&base, COORDINATOR_FILE)? {
        prompts.apply_coordinator(f);
    }
    tracing::debug!(dir = %base.display(), "loaded prompts");
    Ok(prompts)
}

/// [`load`], falling back to the embedded defaults when the directory is absent.
/// Parse errors are logged and also fall back.
pub fn load_or_default(dir: Option<&Path>) -> AgentPrompts {
    match load(dir) {
        Ok(p) => p,
        Err(PromptsLoadError::DirNotFound(_)) => default_from_embedded(),
        Err(e) => {
            tracing::warn!(error = %e, "using embedded prompts");
            default_from_embedded()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_defaults_are_all_present() {
        let p = default_from_embedded();
        for (name, value) in [
            ("retrieval_system", &p.retrieval_system),
            ("grade", &p.grade),
            ("rewrite", &p.rewrite),
            ("generate", &p.generate),
            ("tool_agent_system", &p.tool_agent_system),
            ("coordinator_system", &p.coordinator_system),
            ("labeler_definition", &p.labeler_definition),
            ("community_guidelines", &p.community_guidelines),
            ("researcher_system", &p.researcher_system),
            ("feedback_system", &p.feedback_system),
        ] {
            assert!(!value.trim().is_empty(), "{} is empty", name);
        }
        assert!(p.grade.contains("{question}") && p.grade.contains("{context}"));
    }

    #[test]
    fn load_nonexistent_dir_returns_error() {
        let err = load(Some(Path::new("/nonexistent_prompts_dir_12345"))).unwrap_err();
        assert!(matches!(err, PromptsLoadError::DirNotFound(_)));
        assert_eq!(
            load_or_default(Some(Path::new("/nonexistent_prompts_dir_12345"))),
            default_from_embedded()
        );
    }

    /// **Scenario**: a file with one field overrides only that field.
    #[test]
    fn load_overrides_single_field() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("retrieval.yaml"), "rewrite_prompt: \"Better: {question}\"\n").unwrap();
        let p = load(Some(temp.path())).unwrap();
        assert_eq!(p.rewrite, "Better: {question}");
        assert_eq!(p.grade, default_from_embedded().grade);
    }

    #[test]
    fn load_invalid_yaml_returns_parse_error() {
        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("coordinator.yaml"), "system_prompt: [not closed").unwrap();
        let err = load(Some(temp.path())).unwrap_err();
        assert!(matches!(err, PromptsLoadError::ParseYaml { .. }));
        assert_eq!(load_or_default(Some(temp.path())), default_from_embedded());
    }
}
