use crate::config::{log_config, Config};
use crate::core_auth::IdentityProvider;
use crate::core_network::network;
use anyhow::Result;
use log::{error, info};
use std::sync::Arc;

/// Runs the FTP server with the provided configuration and account database.
///
/// Only returns when the control listener cannot be set up.
pub async fn run(config: Config, identities: Arc<dyn IdentityProvider>) -> Result<()> {
    info!("Starting server with config:");
    log_config(&config);

    if let Err(e) = network::start_server(Arc::new(config), identities).await {
        error!("Failed to start server: {:#}", e);
        return Err(e);
    }

    Ok(())
}
