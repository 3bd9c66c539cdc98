//! Worker API endpoints

use async_trait::async_trait;
use bytes::Bytes;
use mlpipe_core::domain::job::{ResultDocument, WorkerEndpoint};
use mlpipe_core::dto::worker::{DATASET_CONTENT_TYPE, DATASET_FIELD};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Url};
use std::sync::Arc;
use tracing::debug;

use crate::api::{WorkerApi, WorkerConnector};
use crate::error::{ClientError, Result};
use crate::{handle_empty_response, handle_response, normalize_base_url};

/// HTTP client for one worker
#[derive(Debug, Clone)]
pub struct WorkerClient {
    /// Base URL of the worker, including its assigned port
    base_url: String,
    client: Client,
}

impl WorkerClient {
    /// Create a worker client sharing an existing HTTP client
    ///
    /// # Arguments
    /// * `base_url` - The worker base URL (e.g., "http://localhost:9100")
    /// * `client` - A configured reqwest Client
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: normalize_base_url(base_url),
            client,
        }
    }

    /// Get the base URL of the worker
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload the dataset
    ///
    /// # Arguments
    /// * `file_name` - Name reported for the uploaded file
    /// * `payload` - Raw dataset bytes, sent unmodified
    pub async fn post_data(&self, file_name: &str, payload: Bytes) -> Result<()> {
        let url = format!("{}/api/postData/", self.base_url);
        let length = payload.len() as u64;

        let part = Part::stream_with_length(Body::from(payload), length)
            .file_name(file_name.to_string())
            .mime_str(DATASET_CONTENT_TYPE)?;
        let form = Form::new().part(DATASET_FIELD, part);

        debug!("Uploading {} bytes to {}", length, self.base_url);
        let response = self.client.post(&url).multipart(form).send().await?;

        handle_empty_response(response).await
    }

    /// Fetch the training results
    pub async fn fetch_results(&self) -> Result<ResultDocument> {
        let url = format!("{}/api/getResults", self.base_url);
        let response = self.client.get(&url).send().await?;

        handle_response(response).await
    }
}

#[async_trait]
impl WorkerApi for WorkerClient {
    async fn post_data(&self, file_name: &str, payload: Bytes) -> Result<()> {
        WorkerClient::post_data(self, file_name, payload).await
    }

    async fn fetch_results(&self) -> Result<ResultDocument> {
        WorkerClient::fetch_results(self).await
    }
}

/// Connects to workers on the controller's host
///
/// The controller only reports a port, so worker URLs are the controller
/// URL with the port swapped out.
#[derive(Debug, Clone)]
pub struct HttpWorkerConnector {
    host_url: Url,
    client: Client,
}

impl HttpWorkerConnector {
    /// Create a connector for workers living next to the controller
    ///
    /// # Arguments
    /// * `controller_url` - The controller base URL; its scheme and host are reused
    /// * `client` - HTTP client shared by every worker client built here
    pub fn new(controller_url: &str, client: Client) -> Result<Self> {
        let host_url = Url::parse(controller_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", controller_url, e)))?;

        if host_url.cannot_be_a_base() || host_url.host_str().is_none() {
            return Err(ClientError::InvalidUrl(format!(
                "{} has no host",
                controller_url
            )));
        }

        Ok(Self { host_url, client })
    }

    /// Build the base URL of the worker listening on `endpoint`
    pub fn worker_url(&self, endpoint: WorkerEndpoint) -> Result<String> {
        let mut url = self.host_url.clone();
        url.set_port(Some(endpoint.port))
            .map_err(|_| ClientError::InvalidUrl(format!("cannot set port {}", endpoint.port)))?;
        url.set_path("");
        url.set_query(None);

        Ok(normalize_base_url(url.as_str()))
    }
}

impl WorkerConnector for HttpWorkerConnector {
    fn connect(&self, endpoint: WorkerEndpoint) -> Result<Arc<dyn WorkerApi>> {
        let base_url = self.worker_url(endpoint)?;
        debug!("Connecting to worker at {}", base_url);

        Ok(Arc::new(WorkerClient::with_client(base_url, self.client.clone())))
    }
}
