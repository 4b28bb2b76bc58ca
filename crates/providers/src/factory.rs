//! Provider factory — builds the configured backend at startup.
//!
//! Constructed once from `AppConfig` and shared by `Arc`; no global client
//! state anywhere.

use std::sync::Arc;

use mathmentor_config::AppConfig;
use mathmentor_core::error::ProviderError;

use crate::gemini::GeminiProvider;

/// Build the provider named in the configuration.
///
/// The concrete type is returned so callers can take both trait views
/// (`Provider` for the pipeline, `Transcriber` for media input).
pub fn build_from_config(config: &AppConfig) -> Result<Arc<GeminiProvider>, ProviderError> {
    match config.provider.as_str() {
        "gemini" => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                ProviderError::NotConfigured(
                    "No API key found; set MATHMENTOR_API_KEY, GEMINI_API_KEY, or GOOGLE_API_KEY"
                        .into(),
                )
            })?;

            let mut provider =
                GeminiProvider::new(api_key).with_transcription_model(&config.generation_model);
            if let Some(url) = &config.api_url {
                provider = provider.with_base_url(url);
            }

            Ok(Arc::new(provider))
        }
        other => Err(ProviderError::NotConfigured(format!(
            "Unknown provider '{other}' (supported: gemini)"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathmentor_core::Provider as _;

    #[test]
    fn builds_gemini_from_default_config() {
        let config = AppConfig {
            api_key: Some("test-key".into()),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "gemini");
    }

    #[test]
    fn missing_api_key_is_not_configured() {
        let config = AppConfig::default();
        let err = build_from_config(&config).unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let config = AppConfig {
            api_key: Some("k".into()),
            provider: "openai".into(),
            ..AppConfig::default()
        };
        let err = build_from_config(&config).unwrap_err();
        assert!(err.to_string().contains("openai"));
    }
}
