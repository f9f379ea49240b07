//! Error types for the financial support assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {

    // =============================
    // Turn Pipeline Errors
    // =============================

    /// Missing or unusable startup configuration. Fatal.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The chat connection failed to produce a reply.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// The extractor call or its JSON payload failed.
    #[error("Extraction error: {0}")]
    Extraction(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
