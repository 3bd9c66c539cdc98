//! MLPipe Runner
//!
//! Drives a submitted training job through the controller's phases until
//! it finishes, is killed, fails or is cancelled.
//!
//! Architecture:
//! - Configuration: controller address, poll interval, retry ceiling
//! - Context: the per-session state owned by the poll task
//! - Scheduler: the timed poll loop and the phase state machine
//! - Transfer: the dataset upload
//! - Orchestrator: the caller-facing `submit`/`status`/`result`/`cancel`
//!
//! # Example
//!
//! ```no_run
//! use mlpipe_core::domain::job::JobSpec;
//! use mlpipe_runner::{Config, Dataset, JobOrchestrator};
//!
//! # async fn example() -> Result<(), mlpipe_runner::OrchestratorError> {
//! let orchestrator = JobOrchestrator::from_config(Config::from_env())?;
//!
//! let spec = JobSpec(serde_json::json!({ "modelDefinitions": [] }));
//! let handle = orchestrator.submit(spec, Some(Dataset::from_path("iris.csv")))?;
//!
//! let status = orchestrator.wait(&handle).await?;
//! println!("Session ended in {}", status.phase);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod dataset;
pub mod error;
pub mod orchestrator;
pub mod scheduler;
pub mod transfer;

#[cfg(test)]
mod mock;

pub use config::Config;
pub use dataset::Dataset;
pub use error::{OrchestratorError, Result};
pub use orchestrator::{JobOrchestrator, SessionHandle};
