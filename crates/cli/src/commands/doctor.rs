//! `mathmentor doctor` — Diagnose system health.
//!
//! Runs the checks in dependency order: config, API key, local files, then
//! the provider and a full pipeline smoke run. The smoke run calls the real
//! API, so it only happens once everything before it looks healthy.

use std::sync::Arc;

use mathmentor_config::AppConfig;
use mathmentor_core::memory::MemoryStore;
use mathmentor_core::provider::Provider;
use mathmentor_core::result::PipelineStatus;
use mathmentor_knowledge::VectorIndex;
use mathmentor_memory::FileStore;
use mathmentor_providers::GeminiProvider;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 MathMentor Doctor — System Diagnostics");
    println!("=========================================\n");

    let mut issues = 0;

    // Check the config file
    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file — run `mathmentor onboard` (checking defaults)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            if config_path.exists() {
                println!("  ✅ Config file parses and validates");
            }
            config
        }
        Err(e) => {
            println!("  ❌ Config file problem: {e}");
            println!("\n  ⚠️  Fix the config file and re-run doctor.");
            return Ok(());
        }
    };

    // Check the API key
    if let Some(key) = &config.api_key {
        println!("  ✅ API key configured ({})", redact_key(key));
    } else {
        println!("  ❌ No API key — set GEMINI_API_KEY or add api_key to config.toml");
        issues += 1;
    }

    // Check the reference document and the knowledge index
    if config.knowledge.source_path.exists() {
        println!("  ✅ Reference document present");
    } else {
        println!("  ⚠️  No reference document — `mathmentor onboard` writes the default");
        issues += 1;
    }
    if VectorIndex::exists(&config.knowledge.index_dir) {
        println!("  ✅ Knowledge index built");
    } else {
        println!("  ⚠️  Knowledge index not built yet (first solve builds it)");
    }

    // Check the memory log
    let store = FileStore::new(config.memory.path.clone());
    match store.count().await {
        Ok(n) => println!("  ✅ Memory log readable ({n} record(s))"),
        Err(e) => {
            println!("  ❌ Memory log unreadable: {e}");
            issues += 1;
        }
    }

    // Provider reachability, then the end-to-end smoke run
    if config.has_api_key() {
        match mathmentor_providers::build_from_config(&config) {
            Ok(provider) => match provider.health_check().await {
                Ok(true) => {
                    println!("  ✅ Provider reachable");

                    // Model names come back as "models/gemini-2.0-flash".
                    match provider.list_models().await {
                        Ok(models)
                            if models.iter().any(|m| m.ends_with(&config.generation_model)) =>
                        {
                            println!("  ✅ Model '{}' available", config.generation_model);
                        }
                        Ok(models) if !models.is_empty() => {
                            println!(
                                "  ⚠️  Model '{}' not in the provider's model list",
                                config.generation_model
                            );
                        }
                        _ => {}
                    }

                    println!("\n  Running end-to-end check (this calls the API)...");
                    match smoke_run(&config, provider).await {
                        Ok(status) => {
                            println!("  ✅ Pipeline answered with status {status:?}")
                        }
                        Err(e) => {
                            println!("  ❌ Pipeline smoke run failed: {e}");
                            issues += 1;
                        }
                    }
                }
                Ok(false) => {
                    println!("  ❌ Provider unreachable");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Provider check failed: {e}");
                    issues += 1;
                }
            },
            Err(e) => {
                println!("  ❌ Provider setup failed: {e}");
                issues += 1;
            }
        }
    } else {
        println!("  ⚠️  Skipping provider and pipeline checks (no API key)");
    }

    println!();
    match issues {
        0 => println!("  🎉 Everything looks healthy."),
        n => println!("  ⚠️  {n} issue(s) found — fix the items above and re-run."),
    }

    Ok(())
}

async fn smoke_run(
    config: &AppConfig,
    provider: Arc<GeminiProvider>,
) -> Result<PipelineStatus, Box<dyn std::error::Error>> {
    let (pipeline, _memory) = super::build_pipeline(config, provider).await?;
    let result = pipeline.run("Solve x + 5 = 10").await?;
    Ok(result.status)
}

/// Show enough of the key to recognize it without exposing it.
fn redact_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let start: String = chars[..5].iter().collect();
    let end: String = chars[chars.len() - 3..].iter().collect();
    format!("{start}...{end}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_key_shows_edges_only() {
        assert_eq!(redact_key("AIzaSyExample1234567890"), "AIzaS...890");
    }

    #[test]
    fn redact_key_masks_short_keys_entirely() {
        assert_eq!(redact_key("secret"), "******");
    }
}
