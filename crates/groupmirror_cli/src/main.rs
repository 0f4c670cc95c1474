//! groupmirror CLI
//!
//! Serves a cached copy of a Google Workspace group directory.
//!
//! # Commands
//!
//! - `server` - Sync from the Admin SDK and serve the API
//! - `mock` - Serve a persisted `directory.json` without syncing

mod commands;

use clap::{Parser, Subcommand};
use commands::{mock::MockArgs, server::ServerArgs};
use tracing_subscriber::EnvFilter;

/// Cached access to the Google groups directory.
#[derive(Parser)]
#[command(name = "groupmirror")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the directory server
    Server(ServerArgs),

    /// Run the mock server
    Mock(MockArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Server(args) => commands::server::run(args).await?,
        Commands::Mock(args) => commands::mock::run(args).await?,
    }

    Ok(())
}
