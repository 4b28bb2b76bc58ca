//! `mathmentor status` — Show system status.

use mathmentor_config::AppConfig;
use mathmentor_core::memory::MemoryStore;
use mathmentor_knowledge::VectorIndex;
use mathmentor_memory::FileStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("🧮 MathMentor Status");
    println!("====================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Provider:     {}", config.provider);
    println!("  Model:        {}", config.generation_model);
    println!("  Embeddings:   {}", config.embedding_model);
    println!("  Temperature:  {}", config.temperature);
    println!(
        "  API key:      {}",
        if config.has_api_key() {
            "configured"
        } else {
            "missing"
        }
    );
    println!(
        "  Gateway:      {}:{}",
        config.gateway.host, config.gateway.port
    );

    // Knowledge index state
    if VectorIndex::exists(&config.knowledge.index_dir) {
        println!(
            "  Knowledge:    index built at {}",
            config.knowledge.index_dir.display()
        );
    } else if config.knowledge.source_path.exists() {
        println!("  Knowledge:    no index yet (built on first solve)");
    } else {
        println!("  Knowledge:    no reference document — run `mathmentor onboard`");
    }

    // Memory log state
    let store = FileStore::new(config.memory.path.clone());
    match store.count().await {
        Ok(n) => println!(
            "  Memory:       {} confirmed solution(s) at {}",
            n,
            config.memory.path.display()
        ),
        Err(e) => println!("  Memory:       unreadable ({e})"),
    }

    // Config file existence
    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `mathmentor onboard` first");
    }

    Ok(())
}
