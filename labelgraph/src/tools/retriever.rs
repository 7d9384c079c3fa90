//! Retriever exposed as a tool: the model sends a query and gets back rendered documents.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::retrieval::{Document, Retriever, DEFAULT_K};

use super::{required_str, Tool, ToolCallContent, ToolSourceError, ToolSpec};

pub const TOOL_RETRIEVE_BSKY_DOCS: &str = "retrieve_bsky_docs";
pub const TOOL_RETRIEVE_SOURCE_CODE: &str = "retrieve_source_code";

const NO_DOCUMENTS: &str = "No relevant documents found.";

pub struct RetrieverTool {
    name: String,
    description: String,
    retriever: Arc<dyn Retriever>,
    k: usize,
}

impl RetrieverTool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        retriever: Arc<dyn Retriever>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            retriever,
            k: DEFAULT_K,
        }
    }

    /// `retrieve_bsky_docs`: Bluesky / AT Protocol documentation.
    pub fn bsky_docs(retriever: Arc<dyn Retriever>) -> Self {
        Self::new(
            TOOL_RETRIEVE_BSKY_DOCS,
            "Search and return information about Bluesky, the AT Protocol, labelers and moderation.",
            retriever,
        )
    }

    /// `retrieve_source_code`: the labeler service source tree.
    pub fn source_code(retriever: Arc<dyn Retriever>) -> Self {
        Self::new(
            TOOL_RETRIEVE_SOURCE_CODE,
            "Search and return snippets of the Bluesky source code relevant to the query.",
            retriever,
        )
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }
}

/// Documents rendered for the model, separated by blank lines.
pub(crate) fn render_documents(docs: &[Document]) -> String {
    if docs.is_empty() {
        return NO_DOCUMENTS.to_string();
    }
    docs.iter()
        .map(Document::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[async_trait]
impl Tool for RetrieverTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.clone(),
            description: Some(self.description.clone()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "What to look up."
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Value) -> Result<ToolCallContent, ToolSourceError> {
        let query = required_str(&args, "query")?;
        let docs = self
            .retriever
            .search(query, self.k)
            .await
            .map_err(|e| ToolSourceError::Execution(e.to_string()))?;
        Ok(ToolCallContent::text(render_documents(&docs)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::{HashEmbedder, InMemoryVectorStore};

    #[test]
    fn render_documents_empty_and_joined() {
        assert_eq!(render_documents(&[]), "No relevant documents found.");
        let docs = vec![
            Document::new("a").with_metadata("source", "x"),
            Document::new("b"),
        ];
        assert_eq!(
            render_documents(&docs),
            "Source: {\"source\":\"x\"}\nContent: a\n\nSource: {}\nContent: b"
        );
    }

    /// **Scenario**: the tool returns at most k documents and requires `query`.
    #[tokio::test]
    async fn call_respects_k_and_requires_query() {
        let store = InMemoryVectorStore::from_documents(
            Arc::new(HashEmbedder::default()),
            vec![
                Document::new("labelers emit labels"),
                Document::new("labels have severity"),
                Document::new("feeds rank posts"),
            ],
        )
        .await
        .unwrap();
        let tool = RetrieverTool::bsky_docs(Arc::new(store)).with_k(2);
        assert_eq!(tool.name(), "retrieve_bsky_docs");
        let out = tool.call(json!({"query": "labels"})).await.unwrap();
        assert_eq!(out.text.matches("Content: ").count(), 2);

        let err = tool.call(json!({})).await.unwrap_err();
        assert!(matches!(err, ToolSourceError::InvalidInput(_)));
    }
}
