//! `mathmentor gateway` — Start the HTTP API server.

use mathmentor_config::AppConfig;

pub async fn run(
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(host) = host_override {
        config.gateway.host = host;
    }
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    super::require_api_key(&config)?;
    super::ensure_reference_document(&config.knowledge.source_path)?;

    println!("🧮 MathMentor Gateway");
    println!(
        "   Listening:  {}:{}",
        config.gateway.host, config.gateway.port
    );
    println!("   Endpoints:  GET /health");
    println!("               POST /api/v1/solve");
    println!("               POST /api/v1/feedback");

    mathmentor_gateway::start(config).await?;

    Ok(())
}
