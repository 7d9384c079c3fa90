//! Prompt text for the agents.
//!
//! Defaults live in `labelgraph/prompts/*.yaml` and are embedded at compile time. A
//! directory with the same file names (`LABELGRAPH_PROMPTS_DIR`) overrides any subset of
//! fields; see [`load`] and [`load_or_default`].

mod load;

pub use load::{default_from_embedded, load, load_or_default, PromptsLoadError};

use serde::Deserialize;

/// `retrieval.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrievalPromptsFile {
    pub agent_system_prompt: Option<String>,
    pub grade_prompt: Option<String>,
    pub rewrite_prompt: Option<String>,
    pub generate_prompt: Option<String>,
}

/// `tool_agent.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolAgentPromptsFile {
    pub system_prompt: Option<String>,
}

/// `coordinator.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CoordinatorPromptsFile {
    pub system_prompt: Option<String>,
    pub labeler_definition: Option<String>,
    pub community_guidelines: Option<String>,
    pub researcher_system_prompt: Option<String>,
    pub feedback_system_prompt: Option<String>,
}

/// Resolved prompt set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentPrompts {
    pub retrieval_system: String,
    pub grade: String,
    pub rewrite: String,
    pub generate: String,
    pub tool_agent_system: String,
    pub coordinator_system: String,
    pub labeler_definition: String,
    pub community_guidelines: String,
    pub researcher_system: String,
    pub feedback_system: String,
}

fn overlay(target: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *target = v;
    }
}

impl AgentPrompts {
    pub(crate) fn apply_retrieval(&mut self, f: RetrievalPromptsFile) {
        overlay(&mut self.retrieval_system, f.agent_system_prompt);
        overlay(&mut self.grade, f.grade_prompt);
        overlay(&mut self.rewrite, f.rewrite_prompt);
        overlay(&mut self.generate, f.generate_prompt);
    }

    pub(crate) fn apply_tool_agent(&mut self, f: ToolAgentPromptsFile) {
        overlay(&mut self.tool_agent_system, f.system_prompt);
    }

    pub(crate) fn apply_coordinator(&mut self, f: CoordinatorPromptsFile) {
        overlay(&mut self.coordinator_system, f.system_prompt);
        overlay(&mut self.labeler_definition, f.labeler_definition);
        overlay(&mut self.community_guidelines, f.community_guidelines);
        overlay(&mut self.researcher_system, f.researcher_system_prompt);
        overlay(&mut self.feedback_system, f.feedback_system_prompt);
    }

    /// Coordinator system prompt with the labeler definition and guidelines filled in.
    pub fn coordinator_system_prompt(&self) -> String {
        format_template(
            &self.coordinator_system,
            &[
                ("labeler_definition", self.labeler_definition.trim_end()),
                ("community_guidelines", self.community_guidelines.trim_end()),
            ],
        )
    }
}

/// Replaces each `{name}` in `template` with its value. Unknown placeholders and other
/// braces are left as they are; substituted values are not re-scanned.
pub fn format_template(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let matched = after.find('}').and_then(|close| {
            let name = &after[..close];
            vars.iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (close, *v))
        });
        match matched {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
