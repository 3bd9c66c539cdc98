//! Error records surfaced to callers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::phase::Phase;

/// Classification of everything that can go wrong during a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Connection refused, reset or timed out
    TransientNetworkError,
    /// The remote answered with a 5xx
    TransientServerError,
    /// Unexpected status value or malformed response
    ProtocolMismatch,
    /// The controller rejected the session token
    InvalidSession,
    /// No dataset was supplied, or it could not be read
    DatasetMissing,
    /// The dataset upload kept failing until the retry ceiling
    TransferFailure,
    /// The session was cancelled by the caller
    Cancelled,
}

impl ErrorKind {
    /// Transient errors are retried on the next poll tick
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ErrorKind::TransientNetworkError | ErrorKind::TransientServerError
        )
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::TransientNetworkError => "TransientNetworkError",
            ErrorKind::TransientServerError => "TransientServerError",
            ErrorKind::ProtocolMismatch => "ProtocolMismatch",
            ErrorKind::InvalidSession => "InvalidSession",
            ErrorKind::DatasetMissing => "DatasetMissing",
            ErrorKind::TransferFailure => "TransferFailure",
            ErrorKind::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

/// The last error a session ran into
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub message: String,
    /// Local phase at the time of the failure
    pub phase: Phase,
    pub occurred_at: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(kind: ErrorKind, message: impl Into<String>, phase: Phase) -> Self {
        Self {
            kind,
            message: message.into(),
            phase,
            occurred_at: Utc::now(),
        }
    }
}

impl std::fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} during {}: {}", self.kind, self.phase, self.message)
    }
}
