//! Knowledge base for the retriever tools: a directory of docs, split and embedded.

use std::path::Path;
use std::sync::Arc;

use labelgraph::retrieval::{
    load_directory, Embedder, InMemoryVectorStore, RecursiveTextSplitter, RetrievalError,
};

pub const CHUNK_SIZE: usize = 1000;
pub const CHUNK_OVERLAP: usize = 200;

/// Extensions loaded when `--extensions` is not given.
pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "mdx", "txt", "ts", "tsx", "js", "json"];

/// Loads every matching file under `dir`, splits it and indexes the chunks.
/// Without `dir` the store is empty and every search returns nothing.
pub async fn build_knowledge_base(
    embedder: Arc<dyn Embedder>,
    dir: Option<&Path>,
    extensions: &[String],
) -> Result<InMemoryVectorStore, RetrievalError> {
    let store = InMemoryVectorStore::new(embedder);
    let Some(dir) = dir else {
        return Ok(store);
    };

    let extensions: Vec<&str> = if extensions.is_empty() {
        DEFAULT_EXTENSIONS.to_vec()
    } else {
        extensions.iter().map(|e| e.trim_start_matches('.')).collect()
    };
    let documents = load_directory(dir, &extensions)?;
    let chunks = RecursiveTextSplitter::new(CHUNK_SIZE, CHUNK_OVERLAP)?.split_documents(&documents);
    tracing::info!(
        dir = %dir.display(),
        files = documents.len(),
        chunks = chunks.len(),
        "indexing knowledge base"
    );
    store.add_documents(chunks).await?;
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use labelgraph::retrieval::HashEmbedder;

    #[tokio::test]
    async fn indexes_matching_files_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("labelers.md"), "Labelers publish label values.").unwrap();
        std::fs::write(dir.path().join("image.png"), "not text we want").unwrap();

        let store = build_knowledge_base(Arc::new(HashEmbedder::default()), Some(dir.path()), &[])
            .await
            .unwrap();
        assert_eq!(store.len(), 1);

        let only_png = build_knowledge_base(
            Arc::new(HashEmbedder::default()),
            Some(dir.path()),
            &[".png".to_string()],
        )
        .await
        .unwrap();
        assert_eq!(only_png.len(), 1);
    }

    #[tokio::test]
    async fn no_dir_gives_empty_store() {
        let store = build_knowledge_base(Arc::new(HashEmbedder::default()), None, &[])
            .await
            .unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn missing_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_knowledge_base(
            Arc::new(HashEmbedder::default()),
            Some(&dir.path().join("nope")),
            &[],
        )
        .await
        .err().unwrap();
        assert!(matches!(err, RetrievalError::InvalidInput(_)));
    }
}
