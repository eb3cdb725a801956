pub mod assistant;
pub mod config;
pub mod conversation;
pub mod error;
mod http;
pub mod llm;
pub mod prompt;
pub mod render;
pub mod retrieval;
pub mod synthesis;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export primary types for convenience
pub use assistant::{
    AssistantStatus, ChatTurn, GeneratedDocument, Grounding, LegalAssistant,
    INSUFFICIENT_GROUNDING_ANSWER,
};
pub use config::{AssistantConfig, EmbedderConfig, IndexConfig, RetrievalConfig};
pub use conversation::{Conversation, ConversationStore, InMemoryStore, JsonFileStore, Message, Role};
pub use error::{Error, Result, SynthesisError, Upstream};
pub use llm::{GeminiModel, GenerationConfig, LanguageModel};
pub use prompt::PromptBuilder;
pub use render::{suggested_filename, DocumentRenderer, PdfRenderer, PlainTextRenderer};
pub use retrieval::{
    ChromaIndex, Embedder, EvidenceFilter, HuggingFaceEmbedder, Retriever, VectorIndex,
};
pub use synthesis::{
    classify, extract_fields, parse_transcript, Classification, DocumentSynthesizer, DocumentType,
    ExtractedFields, SynthesisMode, SynthesizedDocument,
};
pub use types::{DocumentMetadata, EvidenceItem, RawHit};

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();
}
