//! Provider trait — the abstraction over generative model backends.
//!
//! A Provider knows how to send a single prompt to a text-generation model
//! and get a completion back, and how to map text into embedding vectors.
//! Every pipeline stage is one `complete()` call; knowledge indexing and
//! retrieval go through `embed()`.
//!
//! Implementations: Gemini REST, scripted mocks for tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A single-prompt completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "gemini-2.0-flash")
    pub model: String,

    /// The full instruction prompt
    pub prompt: String,

    /// Sampling temperature; the pipeline runs at 0.0 for reproducibility
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens, when the caller wants one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Math tutoring wants reproducible answers, so the default is deterministic.
fn default_temperature() -> f32 {
    0.0
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            temperature: default_temperature(),
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated text
    pub text: String,

    /// The model that answered; backends may substitute a variant
    pub model: String,

    /// Token counts, when the backend reports them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Token accounting as reported by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// A batch of texts to embed in one call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    /// The model to use for embeddings (e.g., "models/embedding-001").
    pub model: String,

    /// Texts to embed, order preserved in the response.
    pub inputs: Vec<String>,
}

impl EmbeddingRequest {
    pub fn new(model: impl Into<String>, inputs: Vec<String>) -> Self {
        Self {
            model: model.into(),
            inputs,
        }
    }
}

/// Embedding vectors for one request, in input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    /// The embedding vectors, one per input text.
    pub embeddings: Vec<Vec<f32>>,

    /// Which model was used.
    pub model: String,
}

/// Raw media handed to a [`Transcriber`].
#[derive(Debug, Clone)]
pub struct MediaInput {
    /// The raw file bytes.
    pub data: Vec<u8>,

    /// MIME type (e.g., "image/png", "audio/mp3").
    pub mime_type: String,
}

impl MediaInput {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }
}

/// A generative backend the pipeline can run on.
///
/// Stages only ever see this trait, never a concrete client, so swapping
/// Gemini for a scripted mock is a one-line change in the factory.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short identifier (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a prompt and get a completion back.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError>;

    /// Map texts to embedding vectors.
    ///
    /// Backends without an embedding endpoint inherit this default and
    /// report `NotConfigured`.
    async fn embed(
        &self,
        _request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        Err(ProviderError::NotConfigured(format!(
            "Provider '{}' does not support embeddings",
            self.name()
        )))
    }

    /// Model names this backend can serve. Empty when the backend cannot
    /// enumerate them.
    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    /// Cheap reachability probe; `doctor` calls this before anything else.
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

/// Image/audio-to-text transcription, the upstream collaborator that turns
/// uploaded media into the plain problem text the pipeline consumes.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Extract the math problem shown in an image, without solving it.
    async fn transcribe_image(
        &self,
        media: MediaInput,
    ) -> std::result::Result<String, ProviderError>;

    /// Transcribe a spoken math question from an audio clip.
    async fn transcribe_audio(
        &self,
        media: MediaInput,
    ) -> std::result::Result<String, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_request_defaults_to_deterministic() {
        let req = CompletionRequest::new("gemini-2.0-flash", "Solve x + 5 = 10");
        assert!(req.temperature.abs() < f32::EPSILON);
        assert!(req.max_tokens.is_none());
    }

    #[test]
    fn completion_request_builders() {
        let req = CompletionRequest::new("gemini-2.0-flash", "hi")
            .with_temperature(0.4)
            .with_max_tokens(256);
        assert!((req.temperature - 0.4).abs() < f32::EPSILON);
        assert_eq!(req.max_tokens, Some(256));
    }

    #[test]
    fn media_input_keeps_mime_type() {
        let media = MediaInput::new(vec![0x89, 0x50], "image/png");
        assert_eq!(media.mime_type, "image/png");
        assert_eq!(media.data.len(), 2);
    }
}
