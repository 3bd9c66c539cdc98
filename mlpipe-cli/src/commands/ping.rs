//! Ping command

use anyhow::{Context, Result};
use colored::*;
use mlpipe_client::ControllerClient;

use crate::config::Config;

/// Checks the controller answers on its API root
pub async fn handle_ping(config: &Config) -> Result<()> {
    let client = ControllerClient::with_timeout(
        config.controller_url.clone(),
        config.runner_config().request_timeout,
    )?;

    let message = client
        .ping()
        .await
        .with_context(|| format!("Controller at {} is not reachable", config.controller_url))?;

    println!(
        "{} {} {}",
        "✓".green(),
        config.controller_url.bold(),
        message.dimmed()
    );

    Ok(())
}
