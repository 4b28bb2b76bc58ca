//! MathMentor CLI — the main entry point.
//!
//! Commands:
//! - `onboard` — Initialize config, reference document, and memory log
//! - `solve`   — Solve one problem from text, an image, or an audio clip
//! - `gateway` — Start the HTTP API server
//! - `rebuild` — Rebuild the knowledge index from the reference document
//! - `memory`  — Inspect the confirmed-solution log
//! - `status`  — Report config, index, and memory state
//! - `doctor`  — Check config, provider, and stores for problems

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "mathmentor",
    about = "MathMentor — AI math tutoring from text, images, and audio",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log at debug verbosity
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration, reference document, and memory log
    Onboard,

    /// Solve a math problem and optionally confirm the answer
    Solve {
        /// The problem text (omit when using --image or --audio)
        text: Option<String>,

        /// Read the problem from an image file
        #[arg(long, value_name = "PATH", conflicts_with = "audio")]
        image: Option<PathBuf>,

        /// Read the problem from an audio file
        #[arg(long, value_name = "PATH", conflicts_with = "image")]
        audio: Option<PathBuf>,

        /// Record positive feedback without prompting
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Serve the solve API over HTTP
    Gateway {
        /// Override the bind host
        #[arg(long)]
        host: Option<String>,

        /// Port to bind instead of the configured one
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Rebuild the knowledge index from the reference document
    Rebuild,

    /// Inspect the confirmed-solution log
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },

    /// Report config, index, and memory state
    Status,

    /// Check config, provider, and stores for problems
    Doctor,
}

#[derive(Subcommand)]
enum MemoryAction {
    /// List all confirmed solutions
    List,

    /// Print the record count
    Count,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise --verbose bumps the default level to debug.
    let fallback = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Solve {
            text,
            image,
            audio,
            yes,
        } => commands::solve::run(text, image, audio, yes).await?,
        Commands::Gateway { host, port } => commands::gateway::run(host, port).await?,
        Commands::Rebuild => commands::rebuild::run().await?,
        Commands::Memory { action } => match action {
            MemoryAction::List => commands::memory::list().await?,
            MemoryAction::Count => commands::memory::count().await?,
        },
        Commands::Status => commands::status::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
