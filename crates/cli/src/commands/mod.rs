//! CLI subcommand implementations, plus the wiring shared between them.

pub mod doctor;
pub mod gateway;
pub mod memory;
pub mod onboard;
pub mod rebuild;
pub mod solve;
pub mod status;

use std::path::Path;
use std::sync::Arc;

use mathmentor_config::AppConfig;
use mathmentor_core::memory::MemoryStore;
use mathmentor_knowledge::VectorIndex;
use mathmentor_memory::FileStore;
use mathmentor_pipeline::Pipeline;
use mathmentor_providers::GeminiProvider;

/// The reference document compiled into the binary; written out to the
/// configured source path when no document exists yet.
const DEFAULT_REFERENCE: &str = include_str!("../assets/math_reference.md");

/// Write the bundled reference document to `path` unless one is already
/// there. Returns true when a new file was written.
pub(crate) fn ensure_reference_document(path: &Path) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, DEFAULT_REFERENCE)?;
    Ok(true)
}

/// Fail with setup instructions when no API key is configured.
pub(crate) fn require_api_key(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.has_api_key() {
        return Ok(());
    }

    eprintln!();
    eprintln!("  ERROR: No API key configured!");
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    export GEMINI_API_KEY='...'        (recommended)");
    eprintln!("    export GOOGLE_API_KEY='...'");
    eprintln!("    export MATHMENTOR_API_KEY='...'    (generic)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    eprintln!("  Get a Gemini key at: https://aistudio.google.com/apikey");
    eprintln!();
    Err("No API key found. See above for setup instructions.".into())
}

/// Build the stores and the tutoring pipeline from the loaded config.
///
/// Writes the default reference document if the configured one is missing,
/// then opens the knowledge index (building it on first use).
pub(crate) async fn build_pipeline(
    config: &AppConfig,
    provider: Arc<GeminiProvider>,
) -> Result<(Pipeline, Arc<dyn MemoryStore>), Box<dyn std::error::Error>> {
    ensure_reference_document(&config.knowledge.source_path)?;

    let memory: Arc<dyn MemoryStore> = Arc::new(FileStore::new(config.memory.path.clone()));
    let knowledge = Arc::new(
        VectorIndex::open_or_build(
            provider.clone(),
            &config.embedding_model,
            &config.knowledge.index_dir,
            &config.knowledge.source_path,
            config.knowledge.chunk_size,
        )
        .await?,
    );

    let mut pipeline = Pipeline::new(
        provider,
        memory.clone(),
        knowledge,
        &config.generation_model,
    )
    .with_temperature(config.temperature)
    .with_top_k(config.knowledge.top_k);
    if let Some(max_tokens) = config.max_tokens {
        pipeline = pipeline.with_max_tokens(max_tokens);
    }

    Ok((pipeline, memory))
}
