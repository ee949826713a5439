//! localpilot - a coding agent for models served by a local Ollama

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{chat_command, init_command, status_command, ChatOptions};

/// localpilot - coding agent for your terminal
#[derive(Parser)]
#[command(name = "localpilot")]
#[command(about = "◆ A coding agent for local models")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the config file
    Init,
    /// Show config and backend status
    Status,
    /// Chat with the agent
    Chat {
        /// Model to use instead of the configured one
        #[arg(short, long)]
        model: Option<String>,
        /// Do not ask the model for separate reasoning
        #[arg(long)]
        no_think: bool,
        /// Directory the tools operate in
        #[arg(short, long)]
        dir: Option<PathBuf>,
        /// Verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Chat { verbose: true, .. });
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init => {
            if let Err(e) = init_command().await {
                error!("Init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::Status => {
            if let Err(e) = status_command().await {
                error!("Status failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Commands::Chat {
            model,
            no_think,
            dir,
            verbose: _,
        } => {
            let options = ChatOptions {
                model,
                no_think,
                dir,
            };
            if let Err(e) = chat_command(options).await {
                error!("Chat failed: {:#}", e);
                std::process::exit(1);
            }
        }
    }
}
