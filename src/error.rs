//! Error types for knowledge tracing

use thiserror::Error;

/// Error type for knowledge-tracing operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KnowledgeTraceError {
    /// A supplied value violates a precondition (negative variance, non-finite input, bad config)
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Export was requested in a format that is not supported
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// An event arrived earlier than the last update recorded for one of its topics
    #[error("event at {current} precedes last update of topic {topic} at {previous}")]
    OrderingViolation {
        topic: String,
        previous: f64,
        current: f64,
    },

    /// Serialization or reconstruction of an exported record failed
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for KnowledgeTraceError {
    fn from(err: serde_json::Error) -> Self {
        KnowledgeTraceError::Serialization(err.to_string())
    }
}

/// Result type alias for knowledge-tracing operations
pub type Result<T> = std::result::Result<T, KnowledgeTraceError>;
