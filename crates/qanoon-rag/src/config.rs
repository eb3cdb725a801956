use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::llm::GenerationConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    pub history_path: PathBuf,
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
    pub index: IndexConfig,
    pub embedder: EmbedderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates requested from the vector index
    pub top_k: usize,
    /// Evidence items kept after filtering
    pub return_top: usize,
    pub min_passage_chars: usize,
    pub language_prefix: String,
    /// Upper bound on evidence characters placed in one prompt
    pub max_context_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub url: String,
    pub tenant: String,
    pub database: String,
    pub collection: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderConfig {
    pub endpoint: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Width of the vectors stored in the index; query embeddings must match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
}

impl AssistantConfig {
    /// Validate config values, returning errors for clearly broken configurations.
    pub fn validate(&self) -> Result<()> {
        let retrieval = &self.retrieval;
        if retrieval.top_k == 0 {
            return Err(Error::Config("retrieval.top_k must be > 0".into()));
        }
        if retrieval.return_top == 0 {
            return Err(Error::Config("retrieval.return_top must be > 0".into()));
        }
        if retrieval.return_top > retrieval.top_k {
            return Err(Error::Config(
                "retrieval.return_top must be <= retrieval.top_k".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(Error::Config(
                "generation.temperature must be in [0.0, 2.0]".into(),
            ));
        }
        if self.generation.max_tokens == 0 {
            return Err(Error::Config("generation.max_tokens must be > 0".into()));
        }
        if self.index.collection.trim().is_empty() {
            return Err(Error::Config("index.collection must not be empty".into()));
        }
        Ok(())
    }

    /// Load config from a JSON file, falling back to defaults for missing fields.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply credentials and endpoints from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = var("GEMINI_API_KEY") {
            self.generation.api_key = Some(key);
        }
        if let Some(model) = var("GEMINI_MODEL") {
            self.generation.model = model;
        }
        if let Some(key) = var("CHROMA_API_KEY") {
            self.index.api_key = Some(key);
        }
        if let Some(tenant) = var("CHROMA_TENANT") {
            self.index.tenant = tenant;
        }
        if let Some(database) = var("CHROMA_DATABASE") {
            self.index.database = database;
        }
        if let Some(url) = var("CHROMA_URL") {
            self.index.url = url;
        }
        if let Some(token) = var("HF_API_TOKEN") {
            self.embedder.api_token = Some(token);
        }
        if let Some(path) = var("QANOON_HISTORY_PATH") {
            self.history_path = PathBuf::from(path);
        }
        self
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        let history_path = dirs::data_local_dir()
            .map(|dir| dir.join("qanoon-rag"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chat_history.json");

        Self {
            history_path,
            retrieval: RetrievalConfig::default(),
            generation: GenerationConfig::default(),
            index: IndexConfig::default(),
            embedder: EmbedderConfig::default(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            return_top: 5,
            min_passage_chars: 200,
            language_prefix: "en".to_string(),
            max_context_chars: 12_000,
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            url: "https://api.trychroma.com".to_string(),
            tenant: "default_tenant".to_string(),
            database: "default_database".to_string(),
            collection: "pakistan_law".to_string(),
            api_key: None,
        }
    }
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/pipeline/feature-extraction".to_string(),
            model: "sentence-transformers/all-mpnet-base-v2".to_string(),
            api_token: None,
            dimension: Some(768),
        }
    }
}
