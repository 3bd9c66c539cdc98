//! Configuration module
//!
//! Settings shared by every command.

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// URL of the controller service
    pub controller_url: String,
}

impl Config {
    /// Runner configuration for this controller
    ///
    /// Starts from the `MLPIPE_*` environment so that settings without a
    /// flag still apply.
    pub fn runner_config(&self) -> mlpipe_runner::Config {
        mlpipe_runner::Config {
            controller_url: self.controller_url.clone(),
            ..mlpipe_runner::Config::from_env()
        }
    }
}
