//! Retrieval-augmented generation plumbing.
//!
//! Documents are loaded ([`load_directory`]), split into overlapping chunks
//! ([`RecursiveTextSplitter`]), embedded ([`Embedder`]) and indexed in an
//! [`InMemoryVectorStore`], which answers [`Retriever::search`] by cosine similarity.

mod document;
mod embedder;
mod loader;
mod openai_embedder;
mod splitter;
mod vector_store;

pub use document::Document;
pub use embedder::{Embedder, HashEmbedder};
pub use loader::load_directory;
pub use openai_embedder::OpenAIEmbedder;
pub use splitter::RecursiveTextSplitter;
pub use vector_store::InMemoryVectorStore;

use async_trait::async_trait;
use thiserror::Error;

/// Default number of documents returned by a search.
pub const DEFAULT_K: usize = 4;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("embedding: {0}")]
    Embedding(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Similarity search over a document collection.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Up to `k` documents most relevant to `query`, best first.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Document>, RetrievalError>;
}
