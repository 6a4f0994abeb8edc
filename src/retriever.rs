use std::sync::Arc;

use tracing::debug;

use crate::embeddings::Embedder;
use crate::error::AppError;
use crate::index::{ScoredSegment, VectorIndex};

pub const DEFAULT_TOP_K: usize = 4;

pub type RetrievedSegment = ScoredSegment;

/// Similarity-search view over a loaded index.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl Retriever {
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievedSegment>, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("Query must not be empty".into()));
        }

        let vector = self.embedder.embed(query).await?;
        let hits = self.index.search(&vector, self.top_k)?;

        debug!(
            hits = hits.len(),
            top_score = ?hits.first().map(|h| h.score),
            "Retrieved segments"
        );

        Ok(hits)
    }
}
