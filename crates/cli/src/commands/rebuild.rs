//! `mathmentor rebuild` — Rebuild the knowledge index from the reference
//! document.

use mathmentor_config::AppConfig;
use mathmentor_core::knowledge::KnowledgeStore;
use mathmentor_knowledge::VectorIndex;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    super::require_api_key(&config)?;

    let provider = mathmentor_providers::build_from_config(&config)?;

    if super::ensure_reference_document(&config.knowledge.source_path)? {
        println!(
            "📄 Wrote default reference document: {}",
            config.knowledge.source_path.display()
        );
    }

    let source_text =
        std::fs::read_to_string(&config.knowledge.source_path).map_err(|e| {
            format!(
                "Failed to read {}: {e}",
                config.knowledge.source_path.display()
            )
        })?;

    println!("📚 Rebuilding knowledge index...");
    println!("   Source: {}", config.knowledge.source_path.display());

    let index = VectorIndex::build(
        provider,
        &config.embedding_model,
        &source_text,
        config.knowledge.chunk_size,
        &config.knowledge.index_dir,
    )
    .await?;

    println!(
        "✅ Indexed {} chunk(s) into {}",
        index.chunk_count().await?,
        config.knowledge.index_dir.display()
    );

    Ok(())
}
