//! `mock` command: serve a persisted directory without syncing.

use clap::Args;
use groupmirror_server::{serve, BasicAuth, ServerConfig, DEFAULT_PORT};
use groupmirror_sync_engine::StaticDirectory;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Arguments of the `mock` command.
#[derive(Args, Debug)]
pub struct MockArgs {
    /// Basic auth login in the form of <username>:<password>
    #[arg(short, long)]
    pub basic_auth: String,

    /// Storage location where the directory.json is located
    #[arg(short = 'l', long)]
    pub storage_location: PathBuf,

    /// Port for the API
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

/// Runs the `mock` command until ctrl-c.
pub async fn run(args: MockArgs) -> Result<(), Box<dyn std::error::Error>> {
    let auth = BasicAuth::parse(&args.basic_auth)?;
    let view = Arc::new(StaticDirectory::load(&args.storage_location)?);

    info!(
        port = args.port,
        username = auth.username(),
        storage_location = %args.storage_location.display(),
        "Starting mock server"
    );

    serve(ServerConfig::new(auth).with_port(args.port), view).await?;
    Ok(())
}
