//! Error types for the MLPipe client

use mlpipe_core::domain::error::ErrorKind;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when talking to the controller or a worker
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The controller does not recognise the session token
    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    /// A base URL or worker port could not be turned into a URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Map this error onto the session error taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RequestFailed(e) => {
                if e.is_decode() || e.is_builder() {
                    ErrorKind::ProtocolMismatch
                } else if let Some(status) = e.status() {
                    classify_status(status.as_u16())
                } else {
                    ErrorKind::TransientNetworkError
                }
            }
            Self::ApiError { status, .. } => classify_status(*status),
            Self::ParseError(_) | Self::InvalidUrl(_) => ErrorKind::ProtocolMismatch,
            Self::InvalidToken(_) => ErrorKind::InvalidSession,
        }
    }

    /// Whether retrying on the next poll tick could succeed
    pub fn is_transient(&self) -> bool {
        self.kind().is_transient()
    }

    /// Whether this error ends the session immediately
    pub fn is_fatal(&self) -> bool {
        !self.is_transient()
    }
}

fn classify_status(status: u16) -> ErrorKind {
    match status {
        401 | 403 => ErrorKind::InvalidSession,
        408 | 429 => ErrorKind::TransientServerError,
        s if s >= 500 => ErrorKind::TransientServerError,
        _ => ErrorKind::ProtocolMismatch,
    }
}
