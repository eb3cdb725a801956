//! Hosted sentence-transformers embedder (Hugging Face feature-extraction pipeline)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::Embedder;
use crate::config::EmbedderConfig;
use crate::error::{Error, Result, Upstream};
use crate::http::{build_client, parse_json_response, send_error};

pub struct HuggingFaceEmbedder {
    config: EmbedderConfig,
    client: Client,
}

/// Sentence models return one pooled vector; some deployments wrap it in a batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FeatureResponse {
    Single(Vec<f32>),
    Batch(Vec<Vec<f32>>),
}

impl FeatureResponse {
    fn into_vector(self) -> Option<Vec<f32>> {
        let vector = match self {
            FeatureResponse::Single(v) => v,
            FeatureResponse::Batch(batch) => batch.into_iter().next()?,
        };
        (!vector.is_empty()).then_some(vector)
    }
}

impl HuggingFaceEmbedder {
    pub fn new(config: EmbedderConfig) -> Result<Self> {
        let client = build_client(Upstream::Embedder)?;
        tracing::info!(model = %config.model, "Creating Hugging Face embedder");
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl Embedder for HuggingFaceEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let endpoint = self.endpoint();
        let mut request = self.client.post(&endpoint).json(&json!({
            "inputs": text,
            "options": { "wait_for_model": true },
        }));
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| send_error(Upstream::Embedder, &endpoint, e))?;
        let features: FeatureResponse =
            parse_json_response(response, &endpoint, Upstream::Embedder).await?;

        features
            .into_vector()
            .ok_or_else(|| Error::upstream(Upstream::Embedder, "empty embedding returned"))
    }

    fn dimension(&self) -> Option<usize> {
        self.config.dimension
    }
}
