//! Google Gemini generateContent provider

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{GenerationConfig, LanguageModel};
use crate::error::{Error, Result, Upstream};
use crate::http::{build_client, parse_json_response, send_error};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GeminiModel {
    api_key: String,
    model: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
}

#[derive(Debug, Deserialize)]
struct GoogleCandidate {
    content: Option<GoogleContent>,
}

#[derive(Debug, Deserialize)]
struct GoogleContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Debug, Deserialize)]
struct GooglePart {
    #[serde(default)]
    text: String,
}

impl GeminiModel {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let model = model.into();
        let client = build_client(Upstream::LanguageModel)?;
        tracing::info!(model = %model, "Creating Gemini provider");
        Ok(Self {
            api_key: api_key.into(),
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            client,
        })
    }

    /// Build from configuration; an API key is mandatory.
    pub fn from_config(config: &GenerationConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("generation.api_key (GEMINI_API_KEY) is not set".into()))?;
        Self::new(api_key, config.model.clone())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Accepts both `gemini-2.5-flash` and `models/gemini-2.5-flash`.
    fn endpoint(&self) -> String {
        let model = self.model.trim_start_matches("models/");
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

fn first_text(response: GoogleResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .map(|part| part.text)
        .find(|text| !text.trim().is_empty())
}

#[async_trait]
impl LanguageModel for GeminiModel {
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String> {
        let request = json!({
            "contents": [{
                "parts": [{"text": prompt}]
            }],
            "generationConfig": {
                "temperature": config.temperature,
                "maxOutputTokens": config.max_tokens,
            }
        });

        let endpoint = self.endpoint();
        let response = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| send_error(Upstream::LanguageModel, &endpoint, e))?;

        let result: GoogleResponse =
            parse_json_response(response, &endpoint, Upstream::LanguageModel).await?;

        first_text(result)
            .ok_or_else(|| Error::upstream(Upstream::LanguageModel, "no response from Google Gemini"))
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
