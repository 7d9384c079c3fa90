//! `get_label` and `create_label`, the feedback agent's tools over a [`LabelBook`].

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::tools::{Tool, ToolCallContent, ToolSourceError, ToolSpec};

use super::{LabelBook, LabelError, LabelValueDefinition};

pub const TOOL_GET_LABEL: &str = "get_label";
pub const TOOL_CREATE_LABEL: &str = "create_label";

fn locales_schema() -> Value {
    json!({
        "type": "array",
        "minItems": 1,
        "description": "Label text in different languages.",
        "items": {
            "type": "object",
            "properties": {
                "lang": { "type": "string", "description": "Language code (e.g. en, fr, es). Default en." },
                "name": { "type": "string", "description": "The name of the label." },
                "description": { "type": "string", "description": "The description for the label." }
            },
            "required": ["name"]
        }
    })
}

pub struct GetLabelTool {
    book: LabelBook,
}

impl GetLabelTool {
    pub fn new(book: LabelBook) -> Self {
        Self { book }
    }
}

#[async_trait]
impl Tool for GetLabelTool {
    fn name(&self) -> &str {
        TOOL_GET_LABEL
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_GET_LABEL.to_string(),
            description: Some(
                "Retrieves an existing label value definition. Returns the label or a not-found message."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "identifier": { "type": "string", "description": "Snake_case label identifier." }
                },
                "required": ["identifier"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let identifier = crate::tools::required_str(&args, "identifier")?;
        match self.book.get(identifier).await {
            Some(label) => {
                let text = serde_json::to_string(&label)
                    .map_err(|e| ToolSourceError::Execution(e.to_string()))?;
                Ok(ToolCallContent::text(text))
            }
            None => {
                let ids = self.book.identifiers().await;
                let available = if ids.is_empty() {
                    "none".to_string()
                } else {
                    ids.join(", ")
                };
                Ok(ToolCallContent::text(format!(
                    "Label '{}' not found. Available labels: {}",
                    identifier, available
                )))
            }
        }
    }
}

pub struct CreateLabelTool {
    book: LabelBook,
}

impl CreateLabelTool {
    pub fn new(book: LabelBook) -> Self {
        Self { book }
    }
}

#[async_trait]
impl Tool for CreateLabelTool {
    fn name(&self) -> &str {
        TOOL_CREATE_LABEL
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_CREATE_LABEL.to_string(),
            description: Some("Creates a new label definition and stores it.".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "identifier": { "type": "string", "description": "Snake_case identifier for the label." },
                    "blurs": {
                        "type": "string", "enum": ["content", "media", "none"], "default": "none",
                        "description": "content (entire post), media (images/video), or none."
                    },
                    "severity": {
                        "type": "string", "enum": ["alert", "inform", "none"], "default": "inform",
                        "description": "alert (harmful), inform (informational), or none (neutral)."
                    },
                    "default_setting": {
                        "type": "string", "enum": ["hide", "warn", "ignore"], "default": "ignore",
                        "description": "hide (hidden), warn (shown with warning), or ignore (shown normally)."
                    },
                    "locales": locales_schema()
                },
                "required": ["identifier", "locales"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let label: LabelValueDefinition = serde_json::from_value(args)
            .map_err(|e| ToolSourceError::InvalidInput(e.to_string()))?;
        let identifier = label.identifier.clone();
        match self.book.insert(label).await {
            Ok(()) => {
                tracing::info!(label = %identifier, "label created");
                Ok(ToolCallContent::text(format!(
                    "Successfully created label '{}'",
                    identifier
                )))
            }
            Err(LabelError::Duplicate(id)) => Ok(ToolCallContent::text(format!(
                "Label '{}' already exists. Use get_label to review it.",
                id
            ))),
            Err(e) => Err(ToolSourceError::InvalidInput(e.to_string())),
        }
    }
}
