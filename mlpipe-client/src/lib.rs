//! MLPipe HTTP Client
//!
//! Type-safe HTTP clients for the two services a job submission talks to:
//! the controller (fixed address, issues tokens and tracks job phase) and
//! the worker (dynamically assigned port, receives the dataset and serves
//! results).
//!
//! Both clients are also exposed through the [`ControllerApi`],
//! [`WorkerApi`] and [`WorkerConnector`] traits so the session engine can
//! be driven by test doubles.
//!
//! # Example
//!
//! ```no_run
//! use mlpipe_client::ControllerClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ControllerClient::new("http://localhost:8000");
//!
//!     let token = client.fetch_token().await?;
//!     let status = client.poll_status(&token).await?;
//!
//!     println!("Session {} is {}", token, status);
//!     Ok(())
//! }
//! ```

mod api;
mod controller;
pub mod error;
mod worker;

pub use api::{ControllerApi, WorkerApi, WorkerConnector};
pub use controller::ControllerClient;
pub use error::{ClientError, Result};
pub use worker::{HttpWorkerConnector, WorkerClient};

use serde::de::DeserializeOwned;

/// Handle an API response and deserialize JSON
///
/// This checks the status code and returns an appropriate error if the
/// request failed, or deserializes the response body if successful.
pub(crate) async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}

/// Handle an API response whose body is only an acknowledgement
pub(crate) async fn handle_empty_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    Ok(())
}

/// Strips trailing slashes so paths can be appended with `format!`
pub(crate) fn normalize_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}
