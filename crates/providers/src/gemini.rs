//! Gemini provider implementation.
//!
//! Talks to the Gemini REST API (`generativelanguage.googleapis.com`):
//! - `generateContent` for completions
//! - `batchEmbedContents` for embeddings
//! - `generateContent` with inline base64 media for image/audio transcription
//!
//! Vision-model transcription reads handwritten formulas far better than
//! classical OCR, so the transcriber rides on the same endpoint.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use mathmentor_core::error::ProviderError;
use mathmentor_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const IMAGE_PROMPT: &str =
    "Transcribe the math problem in this image exactly into text/LaTeX. Do not solve it yet.";
const AUDIO_PROMPT: &str = "Listen to this audio and transcribe the math question exactly.";

/// The Gemini generative backend.
#[derive(Debug)]
pub struct GeminiProvider {
    base_url: String,
    api_key: String,
    transcription_model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            transcription_model: "gemini-2.0-flash".to_string(),
            client,
        }
    }

    /// Override the API base URL (proxies, test servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Which model handles image/audio transcription.
    pub fn with_transcription_model(mut self, model: impl Into<String>) -> Self {
        self.transcription_model = model.into();
        self
    }

    /// Shared `generateContent` call used by completions and transcription.
    async fn generate(
        &self,
        model: &str,
        parts: Vec<ApiPart>,
        generation_config: Option<serde_json::Value>,
    ) -> std::result::Result<GenerateResponse, ProviderError> {
        let url = format!("{}/{}:generateContent", self.base_url, model_path(model));

        let mut body = serde_json::json!({
            "contents": [{ "parts": parts }],
        });
        if let Some(config) = generation_config {
            body["generationConfig"] = config;
        }

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let response = check_status(response, model).await?;

        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))
    }
}

#[async_trait]
impl mathmentor_core::Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError> {
        let mut generation_config = serde_json::json!({
            "temperature": request.temperature,
        });
        if let Some(max_tokens) = request.max_tokens {
            generation_config["maxOutputTokens"] = serde_json::json!(max_tokens);
        }

        debug!(provider = %self.name(), model = %request.model, "Sending completion request");

        let api_response = self
            .generate(
                &request.model,
                vec![ApiPart::text(&request.prompt)],
                Some(generation_config),
            )
            .await?;

        let model = api_response
            .model_version
            .clone()
            .unwrap_or_else(|| request.model.clone());
        let usage = api_response.usage_metadata.as_ref().map(|u| Usage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });
        let text = extract_text(api_response)?;

        Ok(CompletionResponse { text, model, usage })
    }

    async fn embed(
        &self,
        request: EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, ProviderError> {
        let model = model_path(&request.model);
        let url = format!("{}/{}:batchEmbedContents", self.base_url, model);

        let requests: Vec<serde_json::Value> = request
            .inputs
            .iter()
            .map(|text| {
                serde_json::json!({
                    "model": model,
                    "content": { "parts": [{ "text": text }] },
                })
            })
            .collect();
        let body = serde_json::json!({ "requests": requests });

        debug!(
            provider = %self.name(),
            model = %request.model,
            count = request.inputs.len(),
            "Sending embedding request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let response = check_status(response, &request.model).await?;

        let api_resp: BatchEmbedResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse embedding response: {e}"))
        })?;

        if api_resp.embeddings.len() != request.inputs.len() {
            return Err(ProviderError::InvalidResponse(format!(
                "Expected {} embeddings, got {}",
                request.inputs.len(),
                api_resp.embeddings.len()
            )));
        }

        Ok(EmbeddingResponse {
            embeddings: api_resp.embeddings.into_iter().map(|e| e.values).collect(),
            model: request.model,
        })
    }

    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let body: ListModelsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(body.models.into_iter().map(|m| m.name).collect())
    }

    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("x-goog-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }
}

#[async_trait]
impl Transcriber for GeminiProvider {
    async fn transcribe_image(
        &self,
        media: MediaInput,
    ) -> std::result::Result<String, ProviderError> {
        debug!(mime = %media.mime_type, bytes = media.data.len(), "Transcribing image");
        let parts = vec![ApiPart::text(IMAGE_PROMPT), ApiPart::inline(&media)];
        let response = self.generate(&self.transcription_model, parts, None).await?;
        extract_text(response)
    }

    async fn transcribe_audio(
        &self,
        media: MediaInput,
    ) -> std::result::Result<String, ProviderError> {
        debug!(mime = %media.mime_type, bytes = media.data.len(), "Transcribing audio");
        let parts = vec![ApiPart::text(AUDIO_PROMPT), ApiPart::inline(&media)];
        let response = self.generate(&self.transcription_model, parts, None).await?;
        extract_text(response)
    }
}

/// Turn a non-200 reply into the matching [`ProviderError`], passing 200s
/// through so callers can deserialize the body.
async fn check_status(
    response: reqwest::Response,
    model: &str,
) -> std::result::Result<reqwest::Response, ProviderError> {
    match response.status().as_u16() {
        200 => Ok(response),
        429 => Err(ProviderError::RateLimited {
            retry_after_secs: 5,
        }),
        401 | 403 => Err(ProviderError::AuthenticationFailed(
            "Gemini rejected the API key".into(),
        )),
        404 => Err(ProviderError::ModelNotFound(model.to_string())),
        status => {
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Gemini returned error");
            Err(ProviderError::ApiError {
                status_code: status,
                message: body,
            })
        }
    }
}

/// Normalize a model name into the API path form ("models/<name>").
fn model_path(model: &str) -> String {
    if model.starts_with("models/") {
        model.to_string()
    } else {
        format!("models/{model}")
    }
}

/// Pull the generated text out of the first candidate.
fn extract_text(response: GenerateResponse) -> std::result::Result<String, ProviderError> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidResponse("No candidates in response".into()))?;

    let text: String = candidate
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderError::InvalidResponse(
            "Candidate contained no text".into(),
        ));
    }

    Ok(text)
}

// --- Gemini API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(
        default,
        rename = "inlineData",
        skip_serializing_if = "Option::is_none"
    )]
    inline_data: Option<ApiInlineData>,
}

impl ApiPart {
    fn text(s: impl Into<String>) -> Self {
        Self {
            text: Some(s.into()),
            inline_data: None,
        }
    }

    fn inline(media: &MediaInput) -> Self {
        Self {
            text: None,
            inline_data: Some(ApiInlineData {
                mime_type: media.mime_type.clone(),
                data: BASE64.encode(&media.data),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ApiCandidate>,

    #[serde(default, rename = "usageMetadata")]
    usage_metadata: Option<ApiUsageMetadata>,

    #[serde(default, rename = "modelVersion")]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCandidate {
    #[serde(default)]
    content: Option<ApiContent>,
}

#[derive(Debug, Deserialize)]
struct ApiContent {
    #[serde(default)]
    parts: Vec<ApiPart>,
}

#[derive(Debug, Deserialize)]
struct ApiUsageMetadata {
    #[serde(default, rename = "promptTokenCount")]
    prompt_token_count: u32,

    #[serde(default, rename = "candidatesTokenCount")]
    candidates_token_count: u32,

    #[serde(default, rename = "totalTokenCount")]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ApiEmbedding>,
}

#[derive(Debug, Deserialize)]
struct ApiEmbedding {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ApiModel>,
}

#[derive(Debug, Deserialize)]
struct ApiModel {
    name: String,
}
