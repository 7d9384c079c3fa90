//! OpenAI embeddings (`text-embedding-3-small` by default).

use async_openai::{
    config::OpenAIConfig,
    types::embeddings::{CreateEmbeddingRequest, EmbeddingInput},
    Client,
};
use async_trait::async_trait;
use env_config::Settings;

use super::{Embedder, RetrievalError};

pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new(), model)
    }

    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        let model = model.into();
        let dimensions = Self::model_dimensions(&model);
        Self {
            client: Client::with_config(config),
            model,
            dimensions,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::with_config(
            crate::llm::openai_config(settings),
            settings.embedding_model.clone(),
        )
    }

    fn model_dimensions(model: &str) -> usize {
        match model {
            "text-embedding-3-large" => 3072,
            _ => 1536,
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let request = CreateEmbeddingRequest {
            input: EmbeddingInput::StringArray(texts.iter().map(|s| s.to_string()).collect()),
            model: self.model.clone(),
            ..Default::default()
        };
        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| RetrievalError::Embedding(format!("OpenAI API error: {}", e)))?;

        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        if data.len() != texts.len() {
            return Err(RetrievalError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                data.len()
            )));
        }
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }

    fn dimension(&self) -> usize {
        self.dimensions
    }
}
