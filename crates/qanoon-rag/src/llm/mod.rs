//! Language model abstraction used to answer grounded prompts

pub mod gemini;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use gemini::GeminiModel;

/// Core trait for language model backends
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for a fully built prompt
    async fn generate(&self, prompt: &str, config: &GenerationConfig) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// Generation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: "models/gemini-2.5-flash".to_string(),
            // Grounded answers should be reproducible
            temperature: 0.0,
            max_tokens: 2000,
            api_key: None,
        }
    }
}
