//! In-memory vector store with cosine similarity search.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use super::{Document, Embedder, RetrievalError, Retriever};

struct Entry {
    document: Document,
    vector: Vec<f32>,
}

/// Documents plus their embeddings. Ties in score keep insertion order.
pub struct InMemoryVectorStore {
    embedder: Arc<dyn Embedder>,
    entries: DashMap<u64, Entry>,
    next: AtomicU64,
}

impl InMemoryVectorStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            entries: DashMap::new(),
            next: AtomicU64::new(0),
        }
    }

    pub async fn from_documents(
        embedder: Arc<dyn Embedder>,
        documents: Vec<Document>,
    ) -> Result<Self, RetrievalError> {
        let store = Self::new(embedder);
        store.add_documents(documents).await?;
        Ok(store)
    }

    /// Embeds and stores `documents`; returns how many were added.
    pub async fn add_documents(&self, documents: Vec<Document>) -> Result<usize, RetrievalError> {
        if documents.is_empty() {
            return Ok(0);
        }
        let texts: Vec<&str> = documents.iter().map(|d| d.content.as_str()).collect();
        let vectors = self.embedder.embed(&texts).await?;
        if vectors.len() != documents.len() {
            return Err(RetrievalError::Embedding(format!(
                "expected {} embeddings, got {}",
                documents.len(),
                vectors.len()
            )));
        }
        let n = documents.len();
        for (document, vector) in documents.into_iter().zip(vectors) {
            let id = self.next.fetch_add(1, Ordering::Relaxed);
            self.entries.insert(id, Entry { document, vector });
        }
        Ok(n)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

#[async_trait]
impl Retriever for InMemoryVectorStore {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Document>, RetrievalError> {
        if k == 0 || self.entries.is_empty() {
            return Ok(Vec::new());
        }
        let query_vec = self
            .embedder
            .embed(&[query])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| RetrievalError::Embedding("no embedding for query".into()))?;

        let mut scored: Vec<(f32, u64, Document)> = self
            .entries
            .iter()
            .map(|e| (cosine(&query_vec, &e.vector), *e.key(), e.document.clone()))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.truncate(k);
        tracing::debug!(query, k, returned = scored.len(), "vector search");
        Ok(scored.into_iter().map(|(_, _, d)| d).collect())
    }
}
