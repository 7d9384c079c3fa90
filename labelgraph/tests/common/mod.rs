//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use labelgraph::retrieval::HashEmbedder;
use labelgraph::{
    Document, InMemoryVectorStore, Tool, ToolCallContent, ToolSourceError, ToolSpec,
};
use serde_json::{json, Value};

/// Echoes its `text` argument and counts calls.
pub struct EchoTool {
    pub name: &'static str,
    pub calls: AtomicUsize,
}

impl EchoTool {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        self.name
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.to_string(),
            description: Some("Echo the text argument.".into()),
            input_schema: json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = args
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolSourceError::InvalidInput("text is required".into()))?;
        Ok(ToolCallContent {
            text: format!("{}: {}", self.name, text),
        })
    }
}

/// Small knowledge base about labelers, indexed with the local hash embedder.
pub async fn labeler_docs_store() -> Arc<InMemoryVectorStore> {
    let docs = vec![
        Document::new("Labelers are moderation services that attach labels to posts and accounts.")
            .with_metadata("source", "guide.md"),
        Document::new("Each label value definition has a severity, a blur setting and locales.")
            .with_metadata("source", "lexicon.md"),
        Document::new("Feeds are custom algorithms that rank posts for a timeline.")
            .with_metadata("source", "feeds.md"),
    ];
    Arc::new(
        InMemoryVectorStore::from_documents(Arc::new(HashEmbedder::default()), docs)
            .await
            .unwrap(),
    )
}
