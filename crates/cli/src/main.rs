//! Medbot CLI
//!
//! Main entry point for the medbot command-line tool.
//! Answers medical questions from a pre-built encyclopedia index.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand};
use medbot_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Medbot CLI - medical question answering over an encyclopedia index
#[derive(Parser, Debug)]
#[command(name = "medbot")]
#[command(about = "Medical question answering over an encyclopedia index", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, env = "MEDBOT_CONFIG")]
    config: Option<PathBuf>,

    /// LLM provider (gemini, ollama)
    #[arg(short, long, global = true, env = "MEDBOT_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "MEDBOT_MODEL")]
    model: Option<String>,

    /// Number of passages retrieved per question
    #[arg(short = 'k', long, global = true)]
    top_k: Option<usize>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a single question and print the answer
    Ask(AskCommand),

    /// Interactive question loop
    Chat(ChatCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration, honoring an explicit --config path
    let config = AppConfig::load_with(cli.config)?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.provider,
        cli.model,
        cli.top_k,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Medbot CLI starting");
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);
    tracing::debug!("Top-k: {}", config.retrieval.top_k);

    // Fail fast on misconfiguration, before any request is made
    config.validate()?;

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
