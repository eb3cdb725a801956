//! Chat turns and document generation over a persisted conversation

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AssistantConfig;
use crate::conversation::{Conversation, ConversationStore, JsonFileStore, Role};
use crate::error::{Error, Result};
use crate::llm::{GeminiModel, GenerationConfig, LanguageModel};
use crate::prompt::PromptBuilder;
use crate::render::{suggested_filename, DocumentRenderer};
use crate::retrieval::{ChromaIndex, Embedder, HuggingFaceEmbedder, Retriever, VectorIndex};
use crate::synthesis::{DocumentSynthesizer, SynthesisMode, SynthesizedDocument};
use crate::types::RawHit;

/// Reply used when no passage survives the evidence filter. The model is not consulted.
pub const INSUFFICIENT_GROUNDING_ANSWER: &str = "I couldn't find relevant evidence in the legal \
database for your query. Please try rephrasing your question or ask about Pakistani legal topics.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grounding {
    /// Answer generated from at least one evidence passage
    Grounded,
    Insufficient,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub answer: String,
    pub grounding: Grounding,
    pub evidence_count: usize,
    /// `msg_{n}`, n being the conversation length after this turn
    pub message_id: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistantStatus {
    pub model: String,
    pub top_k: usize,
    pub return_top: usize,
    pub collection: String,
}

#[derive(Debug, Clone)]
pub struct GeneratedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: &'static str,
    pub document: SynthesizedDocument,
}

pub struct LegalAssistant {
    retriever: Retriever,
    prompt_builder: PromptBuilder,
    model: Arc<dyn LanguageModel>,
    store: Arc<dyn ConversationStore>,
    synthesizer: DocumentSynthesizer,
    generation: GenerationConfig,
    collection: String,
}

impl LegalAssistant {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        model: Arc<dyn LanguageModel>,
        store: Arc<dyn ConversationStore>,
        config: &AssistantConfig,
    ) -> Self {
        Self {
            retriever: Retriever::new(embedder, index, &config.retrieval),
            prompt_builder: PromptBuilder::new(config.retrieval.max_context_chars),
            model,
            store,
            synthesizer: DocumentSynthesizer::default(),
            generation: config.generation.clone(),
            collection: config.index.collection.clone(),
        }
    }

    /// Wire up the hosted collaborators: Hugging Face embeddings, Chroma, Gemini,
    /// and a JSON history file.
    pub fn from_config(config: AssistantConfig) -> Result<Self> {
        config.validate()?;
        let embedder = Arc::new(HuggingFaceEmbedder::new(config.embedder.clone())?);
        let index = Arc::new(ChromaIndex::new(config.index.clone())?);
        let model = Arc::new(GeminiModel::from_config(&config.generation)?);
        let store = Arc::new(JsonFileStore::new(config.history_path.clone()));

        tracing::info!(
            collection = %config.index.collection,
            model = %config.generation.model,
            history = %config.history_path.display(),
            "Legal assistant ready"
        );
        Ok(Self::new(embedder, index, model, store, &config))
    }

    /// Answer one question from retrieved evidence and record the exchange.
    /// Nothing is written to history if any step fails.
    pub async fn ask(&self, query: &str) -> Result<ChatTurn> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }

        let mut conversation = self.store.load()?;

        let evidence = self.retriever.retrieve(query).await.map_err(|e| {
            tracing::error!(error = %e, "Retrieval failed");
            e
        })?;

        let (answer, grounding) = if evidence.is_empty() {
            tracing::warn!("No evidence survived filtering, answering without the model");
            (INSUFFICIENT_GROUNDING_ANSWER.to_string(), Grounding::Insufficient)
        } else {
            let prompt = self.prompt_builder.build(query, &evidence);
            let answer = self
                .model
                .generate(&prompt, &self.generation)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, model = self.model.model_name(), "Generation failed");
                    e
                })?;
            (answer.trim().to_string(), Grounding::Grounded)
        };

        conversation.push(Role::User, query);
        conversation.push(Role::Assistant, answer.clone());
        self.store.save(&conversation)?;

        tracing::info!(
            evidence = evidence.len(),
            grounded = grounding == Grounding::Grounded,
            messages = conversation.len(),
            "Chat turn complete"
        );

        Ok(ChatTurn {
            answer,
            grounding,
            evidence_count: evidence.len(),
            message_id: format!("msg_{}", conversation.len()),
            timestamp: Utc::now().to_rfc3339(),
        })
    }

    pub fn history(&self) -> Result<Conversation> {
        self.store.load()
    }

    pub fn clear_history(&self) -> Result<()> {
        self.store.clear()?;
        tracing::info!("Chat history cleared");
        Ok(())
    }

    /// Synthesize a document from the stored conversation and render it.
    pub fn generate_document(
        &self,
        mode: SynthesisMode,
        doc_type: Option<&str>,
        renderer: &dyn DocumentRenderer,
    ) -> Result<GeneratedDocument> {
        let conversation = self.store.load()?;
        let document = self.synthesizer.synthesize(&conversation, mode, doc_type)?;
        let bytes = renderer.render(&document)?;
        let filename = suggested_filename(&document.doc_type, mode, Utc::now(), renderer.extension());

        tracing::info!(filename = %filename, bytes = bytes.len(), "Generated document");
        Ok(GeneratedDocument {
            bytes,
            filename,
            content_type: renderer.content_type(),
            document,
        })
    }

    /// Stored passages straight from the index, for inspecting the collection
    pub async fn sample_passages(&self, limit: usize) -> Result<Vec<RawHit>> {
        self.retriever.sample(limit).await
    }

    pub fn status(&self) -> AssistantStatus {
        AssistantStatus {
            model: self.model.model_name().to_string(),
            top_k: self.retriever.top_k(),
            return_top: self.retriever.return_top(),
            collection: self.collection.clone(),
        }
    }
}
