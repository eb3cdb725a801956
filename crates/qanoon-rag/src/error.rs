use std::fmt;

use thiserror::Error;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// The network collaborator that failed a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Embedder,
    VectorIndex,
    LanguageModel,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Upstream::Embedder => "embedder",
            Upstream::VectorIndex => "vector index",
            Upstream::LanguageModel => "language model",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SynthesisError {
    #[error("cannot synthesize a document from an empty conversation")]
    EmptyConversation,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("query cannot be empty")]
    EmptyQuery,

    #[error(transparent)]
    Synthesis(#[from] SynthesisError),

    #[error("{service} unavailable: {message}")]
    UpstreamUnavailable { service: Upstream, message: String },

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("render failed: {0}")]
    Render(String),
}

impl Error {
    pub fn upstream(service: Upstream, message: impl Into<String>) -> Self {
        Error::UpstreamUnavailable {
            service,
            message: message.into(),
        }
    }

    /// True for failures of an external collaborator rather than of the input
    pub fn is_upstream(&self) -> bool {
        matches!(self, Error::UpstreamUnavailable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_message_names_service() {
        let err = Error::upstream(Upstream::VectorIndex, "connection refused");
        assert!(err.is_upstream());
        assert_eq!(err.to_string(), "vector index unavailable: connection refused");
    }

    #[test]
    fn test_synthesis_error_converts() {
        let err: Error = SynthesisError::EmptyConversation.into();
        assert!(matches!(err, Error::Synthesis(SynthesisError::EmptyConversation)));
        assert!(!err.is_upstream());
    }
}
