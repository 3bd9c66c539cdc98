//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod ping;
mod status;
mod submit;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a job and follow it until it ends
    Submit {
        /// Job specification (JSON file)
        #[arg(long)]
        spec: PathBuf,

        /// Training dataset (CSV file)
        #[arg(long)]
        dataset: PathBuf,

        /// Seconds between status polls
        #[arg(long)]
        interval: Option<u64>,

        /// Consecutive transient failures tolerated before giving up
        #[arg(long)]
        max_failures: Option<u32>,
    },
    /// Poll the status of an existing session once
    Status {
        /// Session token issued by the controller
        #[arg(long)]
        token: String,
    },
    /// Check that the controller is reachable
    Ping,
}

/// Handle a CLI command
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Submit {
            spec,
            dataset,
            interval,
            max_failures,
        } => submit::handle_submit(config, &spec, dataset, interval, max_failures).await,
        Commands::Status { token } => status::handle_status(config, token).await,
        Commands::Ping => ping::handle_ping(config).await,
    }
}
