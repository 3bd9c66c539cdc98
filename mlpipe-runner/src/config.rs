//! Runner configuration
//!
//! Defines the controller address and the polling/retry parameters used
//! by every session the orchestrator starts.

use std::time::Duration;

use crate::error::{OrchestratorError, Result};

const DEFAULT_CONTROLLER_URL: &str = "http://localhost:8000";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_MAX_CONSECUTIVE_FAILURES: u32 = 5;
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Orchestrator configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Controller base URL (e.g., "http://localhost:8000")
    pub controller_url: String,

    /// How often each session polls the controller
    pub poll_interval: Duration,

    /// Transient failures in a row before a session gives up
    pub max_consecutive_failures: u32,

    /// Timeout applied to every HTTP request
    pub request_timeout: Duration,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(controller_url: String) -> Self {
        Self {
            controller_url,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Expected environment variables (all optional):
    /// - MLPIPE_CONTROLLER_URL (default: http://localhost:8000)
    /// - MLPIPE_POLL_INTERVAL (seconds, default: 2)
    /// - MLPIPE_MAX_FAILURES (default: 5)
    /// - MLPIPE_REQUEST_TIMEOUT (seconds, default: 30)
    pub fn from_env() -> Self {
        let controller_url = std::env::var("MLPIPE_CONTROLLER_URL")
            .unwrap_or_else(|_| DEFAULT_CONTROLLER_URL.to_string());

        let poll_interval = std::env::var("MLPIPE_POLL_INTERVAL")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_POLL_INTERVAL);

        let max_consecutive_failures = std::env::var("MLPIPE_MAX_FAILURES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_MAX_CONSECUTIVE_FAILURES);

        let request_timeout = std::env::var("MLPIPE_REQUEST_TIMEOUT")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        Self {
            controller_url,
            poll_interval,
            max_consecutive_failures,
            request_timeout,
        }
    }

    /// Overrides the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Overrides the transient failure ceiling
    pub fn with_max_consecutive_failures(mut self, ceiling: u32) -> Self {
        self.max_consecutive_failures = ceiling;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.controller_url.is_empty() {
            return Err(OrchestratorError::InvalidConfig(
                "controller_url cannot be empty".to_string(),
            ));
        }

        if !self.controller_url.starts_with("http://")
            && !self.controller_url.starts_with("https://")
        {
            return Err(OrchestratorError::InvalidConfig(
                "controller_url must start with http:// or https://".to_string(),
            ));
        }

        if self.poll_interval.is_zero() {
            return Err(OrchestratorError::InvalidConfig(
                "poll_interval must be greater than 0".to_string(),
            ));
        }

        if self.max_consecutive_failures == 0 {
            return Err(OrchestratorError::InvalidConfig(
                "max_consecutive_failures must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout.is_zero() {
            return Err(OrchestratorError::InvalidConfig(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_CONTROLLER_URL.to_string())
    }
}
