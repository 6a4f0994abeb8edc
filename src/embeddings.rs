use async_openai::types::{CreateEmbeddingRequest, EmbeddingInput};
use async_openai::Embeddings;
use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use async_trait::async_trait;
use tracing::debug;

use crate::error::AppError;
use crate::policy::CallPolicy;

/// Largest number of inputs sent in a single embeddings request.
pub const EMBED_BATCH_SIZE: usize = 512;

#[async_trait]
pub trait Embedder: Send + Sync {
    fn model(&self) -> &str;

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        self.embed_batch(vec![text.to_owned()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LlmParsing("No embedding data received".into()))
    }
}

#[derive(Clone)]
pub struct OpenAIEmbedder {
    client: OpenAIClient<OpenAIConfig>,
    model: String,
}

impl OpenAIEmbedder {
    pub fn new(client: OpenAIClient<OpenAIConfig>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed_batch(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, AppError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let expected = texts.len();
        let request = CreateEmbeddingRequest {
            model: self.model.clone(),
            input: EmbeddingInput::StringArray(texts),
            user: None,
            ..Default::default()
        };

        let response = Embeddings::new(&self.client).create(request).await?;

        // The API may answer out of order; `index` is authoritative.
        let mut data = response.data;
        data.sort_by_key(|item| item.index);

        if data.len() != expected {
            return Err(AppError::LlmParsing(format!(
                "Expected {expected} embeddings, received {}",
                data.len()
            )));
        }

        debug!(count = data.len(), model = %self.model, "Received embeddings");

        Ok(data.into_iter().map(|item| item.embedding).collect())
    }
}

/// Embeds `texts` in request-sized batches, preserving input order. Each
/// batch is one provider call under `policy`.
pub async fn embed_all(
    embedder: &dyn Embedder,
    texts: &[String],
    policy: &CallPolicy,
) -> Result<Vec<Vec<f32>>, AppError> {
    let mut vectors = Vec::with_capacity(texts.len());
    for batch in texts.chunks(EMBED_BATCH_SIZE) {
        let embedded = policy
            .run("embedding", || embedder.embed_batch(batch.to_vec()))
            .await?;
        if embedded.len() != batch.len() {
            return Err(AppError::LlmParsing(format!(
                "Embedding provider returned {} vectors for {} inputs",
                embedded.len(),
                batch.len()
            )));
        }
        vectors.extend(embedded);
    }
    Ok(vectors)
}
