//! Error taxonomy for the MathMentor domain.
//!
//! Each bounded context (provider, memory, knowledge) owns a `thiserror`
//! enum; the pipeline-facing [`Error`] unifies them via `#[from]` so
//! orchestrator code can use one [`Result`] alias throughout.

use thiserror::Error;

/// Failures talking to a generative backend.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// The HTTP exchange worked but the body was not what the API promises.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures of the append-only feedback log.
#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Record serialization failed: {0}")]
    Serialization(String),
}

/// Failures of the reference index.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// The configured reference document does not exist, so there is
    /// nothing to build the index from.
    #[error("Reference document not found: {0}")]
    SourceMissing(String),

    #[error("Index storage error: {0}")]
    Storage(String),

    #[error("Embedding failed: {0}")]
    Embedding(#[from] ProviderError),

    #[error("Index is empty; run a rebuild first")]
    EmptyIndex,
}

/// Unified error for pipeline-level operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("Knowledge error: {0}")]
    Knowledge(#[from] KnowledgeError),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
