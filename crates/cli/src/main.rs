//! krepo CLI
//!
//! Main entry point for the krepo command-line tool.
//! Serves the HR regulation query form and answers one-off questions.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ServeCommand, StoresCommand};
use krepo_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// krepo - HR regulation questions answered from curated knowledge bases
#[derive(Parser, Debug)]
#[command(name = "krepo")]
#[command(about = "HR regulation questions answered from curated knowledge bases", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config file (default: ./krepo.yaml when present)
    #[arg(short, long, global = true, env = "KREPO_CONFIG")]
    config: Option<PathBuf>,

    /// Directory holding document mappings and the statute table
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Search provider (gemini, mock)
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web query form
    Serve(ServeCommand),

    /// Ask one question and print the answer
    Ask(AskCommand),

    /// List knowledge bases and their indexes
    Stores(StoresCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // A missing .env file is fine
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.config)?;

    let bind = match &cli.command {
        Commands::Serve(cmd) => cmd.bind.clone(),
        _ => None,
    };

    let config = config.with_overrides(
        cli.data_dir,
        cli.provider,
        cli.model,
        bind,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("krepo starting");
    if let Ok(path) = dotenv {
        tracing::debug!("Loaded environment from {:?}", path);
    }
    tracing::debug!("Config file: {:?}", config.config_file);
    tracing::debug!("Data dir: {:?}", config.data_dir);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Ask(_) => "ask",
        Commands::Stores(_) => "stores",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Stores(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
