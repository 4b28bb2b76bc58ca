//! `mathmentor memory` — Inspect the confirmed-solution log.
//!
//! The log is append-only and records are never deleted; there is no clear
//! or delete subcommand.

use mathmentor_config::AppConfig;
use mathmentor_core::memory::MemoryStore;
use mathmentor_memory::FileStore;

pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = FileStore::new(config.memory.path.clone());
    let records = store.all().await?;

    println!("🧠 Confirmed Solutions");
    println!("======================");
    println!("  Log: {}", config.memory.path.display());
    println!();

    if records.is_empty() {
        println!("  (empty — confirm a solved problem with `mathmentor solve` first)");
        return Ok(());
    }

    for record in &records {
        println!(
            "  #{:<4} {}  {}",
            record.id,
            record.created_at.format("%Y-%m-%d %H:%M"),
            truncate(&record.question, 60)
        );
    }
    println!();
    println!("  {} record(s)", records.len());

    Ok(())
}

pub async fn count() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = FileStore::new(config.memory.path.clone());
    println!("{}", store.count().await?);
    Ok(())
}

/// Shorten to at most `max` characters, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    format!("{cut}…")
}
