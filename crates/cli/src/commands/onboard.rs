//! `mathmentor onboard` — First-time setup wizard.

use mathmentor_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🧮 MathMentor first-time setup\n");

    // Create the config directory
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Config directory created: {}", config_dir.display());
    } else {
        println!("  Config directory already present: {}", config_dir.display());
    }

    // Write the bundled reference document
    let defaults = AppConfig::default();
    if super::ensure_reference_document(&defaults.knowledge.source_path)? {
        println!(
            "✅ Created reference document: {}",
            defaults.knowledge.source_path.display()
        );
    } else {
        println!(
            "  Reference document exists: {}",
            defaults.knowledge.source_path.display()
        );
    }

    // Initialize an empty memory log
    let memory_path = &defaults.memory.path;
    if !memory_path.exists() {
        if let Some(parent) = memory_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(memory_path, "")?;
        println!("✅ Created memory log: {}", memory_path.display());
    } else {
        println!("  Memory log exists: {}", memory_path.display());
    }

    // Create the config file
    if config_path.exists() {
        println!("\n⚠️  Found an existing config at: {}", config_path.display());
        println!("   Leaving it untouched; edit it directly to change settings.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Wrote config.toml to: {}", config_path.display());
        println!("\n📝 To finish:");
        println!("   1. Set GEMINI_API_KEY (or add api_key to config.toml)");
        println!("   2. Run: mathmentor solve \"Solve x + 5 = 10\"");
        println!("   3. Confirm good answers so future runs can reuse them!\n");
    }

    println!("🎉 Setup complete! Run `mathmentor solve` to get started.\n");

    Ok(())
}
