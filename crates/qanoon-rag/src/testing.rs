//! Deterministic stand-ins for the network collaborators

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::{Error, Result, Upstream};
use crate::llm::{GenerationConfig, LanguageModel};
use crate::retrieval::{Embedder, VectorIndex};
use crate::types::RawHit;

/// Embeds every text as a fixed-width vector derived from its bytes
pub struct StaticEmbedder {
    dimension: usize,
    fail: bool,
}

impl StaticEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            dimension: 0,
            fail: true,
        }
    }
}

#[async_trait]
impl Embedder for StaticEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail {
            return Err(Error::upstream(Upstream::Embedder, "embedder offline"));
        }
        let mut vector = vec![0.0; self.dimension];
        if self.dimension > 0 {
            for (i, byte) in text.bytes().enumerate() {
                vector[i % self.dimension] += byte as f32 / 255.0;
            }
        }
        Ok(vector)
    }

    fn dimension(&self) -> Option<usize> {
        Some(self.dimension)
    }
}

/// Returns the same hits for every query, recording requested `n_results`
pub struct StaticIndex {
    hits: Vec<RawHit>,
    requests: Arc<Mutex<Vec<usize>>>,
    fail: bool,
}

impl StaticIndex {
    pub fn new(hits: Vec<RawHit>) -> Self {
        Self {
            hits,
            requests: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<usize>>> {
        Arc::clone(&self.requests)
    }
}

#[async_trait]
impl VectorIndex for StaticIndex {
    async fn query(&self, _embedding: &[f32], n_results: usize) -> Result<Vec<RawHit>> {
        if self.fail {
            return Err(Error::upstream(Upstream::VectorIndex, "index offline"));
        }
        self.requests.lock().push(n_results);
        Ok(self.hits.iter().take(n_results).cloned().collect())
    }

    async fn sample(&self, limit: usize) -> Result<Vec<RawHit>> {
        if self.fail {
            return Err(Error::upstream(Upstream::VectorIndex, "index offline"));
        }
        Ok(self
            .hits
            .iter()
            .take(limit)
            .cloned()
            .map(|mut hit| {
                hit.distance = 0.0;
                hit
            })
            .collect())
    }
}

/// Replies with a fixed answer and records every prompt it was given
pub struct ScriptedModel {
    reply: String,
    prompts: Arc<Mutex<Vec<(String, GenerationConfig)>>>,
    fail: bool,
}

impl ScriptedModel {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Arc::new(Mutex::new(Vec::new())),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("")
        }
    }

    pub fn prompts(&self) -> Arc<Mutex<Vec<(String, GenerationConfig)>>> {
        Arc::clone(&self.prompts)
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        if self.fail {
            return Err(Error::upstream(Upstream::LanguageModel, "model offline"));
        }
        self.prompts.lock().push((prompt.to_string(), config.clone()));
        Ok(self.reply.clone())
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}
