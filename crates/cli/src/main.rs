//! askrelay CLI: the main entry point.
//!
//! Commands:
//! - `serve`:  start the HTTP gateway
//! - `ask`:    run one question through the pipeline
//! - `models`: list the model catalog
//! - `doctor`: check configuration and credentials

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "askrelay",
    about = "askrelay: search-augmented chat completion relay",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of ~/.askrelay/config.toml
    #[arg(short, long, global = true, env = "ASKRELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question and print the reply
    Ask {
        /// The question
        text: String,

        /// Model id (defaults to completion.default_model)
        #[arg(short, long)]
        model: Option<String>,

        /// IANA timezone for the date preamble
        #[arg(short, long)]
        timezone: Option<String>,
    },

    /// List the model catalog
    Models,

    /// Diagnose configuration and credentials
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Ask {
            text,
            model,
            timezone,
        } => commands::ask::run(config_path, text, model, timezone).await?,
        Commands::Models => commands::models::run(config_path).await?,
        Commands::Doctor => commands::doctor::run(config_path).await?,
    }

    Ok(())
}
