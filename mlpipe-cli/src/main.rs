//! MLPipe CLI
//!
//! Command-line interface for submitting training jobs to an MLPipe
//! controller and following them to completion.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mlpipe")]
#[command(about = "MLPipe training job CLI", long_about = None)]
struct Cli {
    /// Controller URL
    #[arg(
        long,
        env = "MLPIPE_CONTROLLER_URL",
        default_value = "http://localhost:8000"
    )]
    controller_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mlpipe_runner=info,mlpipe_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config {
        controller_url: cli.controller_url,
    };

    handle_command(cli.command, &config).await
}
