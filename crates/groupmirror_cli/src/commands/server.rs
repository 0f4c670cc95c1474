//! `server` command: sync from upstream and serve the API.

use clap::Args;
use groupmirror_server::{serve, BasicAuth, ServerConfig, DEFAULT_PORT};
use groupmirror_sync_engine::{
    DirectoryView, GoogleConnector, SyncConfig, SyncEngine, DEFAULT_CUSTOMER_ID,
    DEFAULT_SYNC_INTERVAL,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Arguments of the `server` command.
#[derive(Args, Debug)]
pub struct ServerArgs {
    /// Location of the service account json file
    #[arg(short = 'a', long)]
    pub service_account: Option<PathBuf>,

    /// The gsuite user to impersonate
    #[arg(short, long)]
    pub subject: Option<String>,

    /// The gsuite customer id
    #[arg(short, long, default_value = DEFAULT_CUSTOMER_ID)]
    pub customer_id: String,

    /// The gsuite domain for which to retrieve the groups
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Sync interval in minutes
    #[arg(short = 'i', long, default_value_t = DEFAULT_SYNC_INTERVAL.as_secs() / 60)]
    pub sync_interval: u64,

    /// Basic auth login in the form of <username>:<password>. Random login is generated if not set
    #[arg(short, long)]
    pub basic_auth: Option<String>,

    /// Storage location for faster restores
    #[arg(short = 'l', long)]
    pub storage_location: Option<PathBuf>,

    /// Port for the API
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,
}

impl ServerArgs {
    pub(crate) fn sync_config(&self) -> SyncConfig {
        let mut config = SyncConfig::new(self.service_account.clone().unwrap_or_default())
            .with_customer_id(&self.customer_id)
            .with_sync_interval_minutes(self.sync_interval);
        if let Some(domain) = &self.domain {
            config = config.with_domain(domain);
        }
        if let Some(subject) = &self.subject {
            config = config.with_subject(subject);
        }
        if let Some(location) = &self.storage_location {
            config = config.with_storage_location(location);
        }
        config
    }
}

/// Runs the `server` command until ctrl-c.
pub async fn run(args: ServerArgs) -> Result<(), Box<dyn std::error::Error>> {
    let auth = match &args.basic_auth {
        Some(login) => BasicAuth::parse(login)?,
        None => {
            let auth = BasicAuth::generate();
            warn!(
                login = %auth.login(),
                "No basic auth login provided, generated one"
            );
            auth
        }
    };

    let config = args.sync_config();
    info!(
        customer_id = %config.customer_id,
        domain = config.domain.as_deref().unwrap_or(""),
        interval_minutes = args.sync_interval,
        port = args.port,
        "Starting directory server"
    );

    let engine = Arc::new(SyncEngine::new(config.clone(), GoogleConnector::new(config))?);
    engine.start();

    let view = Arc::clone(&engine) as Arc<dyn DirectoryView>;
    let served = serve(ServerConfig::new(auth).with_port(args.port), view).await;
    engine.shutdown().await;
    served?;
    Ok(())
}
