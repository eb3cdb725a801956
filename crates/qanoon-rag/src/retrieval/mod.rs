pub mod chroma;
pub mod filter;
pub mod huggingface;

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::{Error, Result, Upstream};
use crate::types::{EvidenceItem, RawHit};

pub use chroma::ChromaIndex;
pub use filter::{DropReason, EvidenceFilter};
pub use huggingface::HuggingFaceEmbedder;

/// Turns text into the vector space the index was built in
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embedding dimension, when known up front. [`Retriever`] rejects
    /// vectors of any other length before querying the index.
    fn dimension(&self) -> Option<usize> {
        None
    }
}

/// Opaque nearest-neighbour service over stored legal passages
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Nearest passages to `embedding`, with documents, metadata and distances
    async fn query(&self, embedding: &[f32], n_results: usize) -> Result<Vec<RawHit>>;

    /// Up to `limit` stored passages in index order. Distances are zero.
    async fn sample(&self, limit: usize) -> Result<Vec<RawHit>>;
}

/// Embed → nearest-neighbour query → evidence filter
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    filter: EvidenceFilter,
    top_k: usize,
    return_top: usize,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        config: &RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            filter: EvidenceFilter::from_config(config),
            top_k: config.top_k,
            return_top: config.return_top,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn return_top(&self) -> usize {
        self.return_top
    }

    pub async fn retrieve(&self, query: &str) -> Result<Vec<EvidenceItem>> {
        let embedding = self.embedder.embed(query).await?;
        if let Some(expected) = self.embedder.dimension() {
            if embedding.len() != expected {
                return Err(Error::upstream(
                    Upstream::Embedder,
                    format!(
                        "embedding has {} dimensions, expected {}",
                        embedding.len(),
                        expected
                    ),
                ));
            }
        }
        let raw = self.index.query(&embedding, self.top_k).await?;
        let raw_count = raw.len();
        let evidence = self.filter.filter(raw, self.return_top);

        tracing::info!(
            raw = raw_count,
            kept = evidence.len(),
            top_k = self.top_k,
            return_top = self.return_top,
            "Retrieved evidence"
        );
        Ok(evidence)
    }

    /// Peek at stored passages without a query
    pub async fn sample(&self, limit: usize) -> Result<Vec<RawHit>> {
        self.index.sample(limit).await
    }
}
