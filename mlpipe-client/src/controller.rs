//! Controller API endpoints

use async_trait::async_trait;
use mlpipe_core::domain::job::{JobSpec, SessionToken, WorkerEndpoint};
use mlpipe_core::dto::controller::{
    PingResponse, PostJobRequest, StatusResponse, TokenResponse, WorkerPortResponse,
};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::api::ControllerApi;
use crate::error::{ClientError, Result};
use crate::{handle_empty_response, handle_response, normalize_base_url};

/// HTTP client for the controller service
#[derive(Debug, Clone)]
pub struct ControllerClient {
    /// Base URL of the controller (e.g., "http://localhost:8000")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ControllerClient {
    /// Create a new controller client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the controller (e.g., "http://localhost:8000")
    ///
    /// # Example
    /// ```
    /// use mlpipe_client::ControllerClient;
    ///
    /// let client = ControllerClient::new("http://localhost:8000");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new controller client with a custom HTTP client
    ///
    /// The same `Client` can be shared with [`crate::HttpWorkerConnector`]
    /// so both services use one connection pool and one timeout policy.
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the controller
    /// * `client` - A configured reqwest Client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            client,
        }
    }

    /// Create a new controller client whose requests time out
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the controller
    /// * `timeout` - Per-request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Get the base URL of the controller
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check that the controller is up
    ///
    /// # Returns
    /// The controller's greeting message
    pub async fn ping(&self) -> Result<String> {
        let url = format!("{}/api", self.base_url);
        let response = self.client.get(&url).send().await?;

        let body: PingResponse = handle_response(response).await?;
        Ok(body.message)
    }

    /// Request a new session token
    pub async fn fetch_token(&self) -> Result<SessionToken> {
        let url = format!("{}/api/fetchtoken", self.base_url);
        let response = self.client.get(&url).send().await?;

        let body: TokenResponse = handle_response(response).await?;
        if body.token.as_str().is_empty() {
            return Err(ClientError::ParseError(
                "Controller issued an empty token".to_string(),
            ));
        }

        debug!("Acquired session token {}", body.token);
        Ok(body.token)
    }

    /// Poll the raw status of a session
    ///
    /// # Arguments
    /// * `token` - The session token
    ///
    /// # Returns
    /// The status string exactly as reported
    pub async fn poll_status(&self, token: &SessionToken) -> Result<String> {
        let url = format!("{}/api/pollstatus", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("token", token.as_str())])
            .send()
            .await?;

        let body: StatusResponse = handle_response(response).await?;
        body.status
            .ok_or_else(|| ClientError::InvalidToken(token.to_string()))
    }

    /// Submit a job specification
    ///
    /// # Arguments
    /// * `token` - The session token
    /// * `job_spec` - The pipeline specification
    pub async fn post_job(&self, token: &SessionToken, job_spec: &JobSpec) -> Result<()> {
        let url = format!("{}/api/postjob/", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&PostJobRequest {
                session_token: token.clone(),
                job_spec: job_spec.clone(),
            })
            .send()
            .await?;

        handle_empty_response(response).await
    }

    /// Look up the worker port assigned to a session
    ///
    /// # Arguments
    /// * `token` - The session token
    pub async fn get_worker_port(&self, token: &SessionToken) -> Result<WorkerEndpoint> {
        let url = format!("{}/api/getworkerport", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("token", token.as_str())])
            .send()
            .await?;

        let body: WorkerPortResponse = handle_response(response).await?;
        let port = u16::try_from(body.worker_port)
            .ok()
            .filter(|port| *port != 0)
            .ok_or_else(|| {
                ClientError::ParseError(format!("Invalid worker port {}", body.worker_port))
            })?;

        Ok(WorkerEndpoint { port })
    }
}

#[async_trait]
impl ControllerApi for ControllerClient {
    async fn fetch_token(&self) -> Result<SessionToken> {
        ControllerClient::fetch_token(self).await
    }

    async fn poll_status(&self, token: &SessionToken) -> Result<String> {
        ControllerClient::poll_status(self, token).await
    }

    async fn post_job(&self, token: &SessionToken, job_spec: &JobSpec) -> Result<()> {
        ControllerClient::post_job(self, token, job_spec).await
    }

    async fn get_worker_port(&self, token: &SessionToken) -> Result<WorkerEndpoint> {
        ControllerClient::get_worker_port(self, token).await
    }
}
