use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A chunk of text plus free-form metadata (`source`, `start_index`, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: Map::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(Value::as_str)
    }

    /// `Source: {metadata}\nContent: {content}`, the form retrieval tools hand to the model.
    pub fn render(&self) -> String {
        format!(
            "Source: {}\nContent: {}",
            Value::Object(self.metadata.clone()),
            self.content
        )
    }
}
