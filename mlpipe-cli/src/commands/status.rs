//! Status command
//!
//! Asks the controller once for the phase of a session started elsewhere.

use anyhow::{Context, Result, bail};
use colored::*;
use mlpipe_client::ControllerClient;
use mlpipe_core::domain::job::SessionToken;
use mlpipe_core::domain::phase::Phase;

use super::submit::colored_phase;
use crate::config::Config;

pub async fn handle_status(config: &Config, token: String) -> Result<()> {
    let client = ControllerClient::with_timeout(
        config.controller_url.clone(),
        config.runner_config().request_timeout,
    )?;
    let token = SessionToken(token);

    let reported = client
        .poll_status(&token)
        .await
        .context("Failed to poll session status")?;

    match Phase::from_wire(&reported) {
        Some(phase) => println!("{} {}", "Phase:".bold(), colored_phase(phase)),
        None => bail!("Controller reported unknown status {:?}", reported),
    }

    Ok(())
}
