//! Error types for the session engine

use mlpipe_client::ClientError;
use mlpipe_core::domain::error::ErrorKind;
use mlpipe_core::domain::phase::Phase;
use mlpipe_core::domain::session::SessionId;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for orchestrator operations
pub type Result<T> = std::result::Result<T, OrchestratorError>;

/// Errors raised by the orchestrator and its sessions
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// A call to the controller or worker failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Submission without a usable dataset
    #[error("Dataset missing: {0}")]
    DatasetMissing(String),

    /// The dataset disappeared or became unreadable after submission
    #[error("Failed to read dataset {path}: {source}")]
    DatasetUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No session is registered under this handle
    #[error("Unknown session: {0}")]
    UnknownSession(SessionId),

    /// The session has not finished yet
    #[error("Result not ready (session is {0})")]
    NotReady(Phase),

    /// The session was cancelled while the operation was in flight
    #[error("Session cancelled")]
    Cancelled,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl OrchestratorError {
    /// Map this error onto the session error taxonomy
    ///
    /// Only errors raised inside a running session are classified
    /// meaningfully; caller-side misuse maps to `ProtocolMismatch`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Client(e) => e.kind(),
            Self::DatasetMissing(_) | Self::DatasetUnreadable { .. } => ErrorKind::DatasetMissing,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::UnknownSession(_) | Self::NotReady(_) | Self::InvalidConfig(_) => {
                ErrorKind::ProtocolMismatch
            }
        }
    }

    /// Whether the next poll tick may retry the failed operation
    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }
}
