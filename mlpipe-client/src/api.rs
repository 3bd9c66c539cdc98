//! Client traits
//!
//! The session engine only sees these traits. The HTTP clients implement
//! them, and tests substitute in-memory doubles.

use async_trait::async_trait;
use bytes::Bytes;
use mlpipe_core::domain::job::{JobSpec, ResultDocument, SessionToken, WorkerEndpoint};
use std::sync::Arc;

use crate::error::Result;

/// Operations offered by the controller service
#[async_trait]
pub trait ControllerApi: Send + Sync {
    /// Requests a new session token. Safe to retry.
    async fn fetch_token(&self) -> Result<SessionToken>;

    /// Fetches the raw status string for a session
    ///
    /// The string is returned unparsed; interpreting it is the phase
    /// controller's job.
    async fn poll_status(&self, token: &SessionToken) -> Result<String>;

    /// Submits the job specification for a session
    ///
    /// Not idempotent on the controller side; callers must make sure it is
    /// sent at most once per `PENDING_JOB` entry.
    async fn post_job(&self, token: &SessionToken, job_spec: &JobSpec) -> Result<()>;

    /// Looks up the worker assigned to a session
    async fn get_worker_port(&self, token: &SessionToken) -> Result<WorkerEndpoint>;
}

/// Operations offered by a worker
#[async_trait]
pub trait WorkerApi: Send + Sync {
    /// Uploads the dataset as a multipart body
    ///
    /// # Arguments
    /// * `file_name` - Name reported for the uploaded file
    /// * `payload` - Raw dataset bytes
    async fn post_data(&self, file_name: &str, payload: Bytes) -> Result<()>;

    /// Fetches the training results
    async fn fetch_results(&self) -> Result<ResultDocument>;
}

/// Builds worker clients once the controller has assigned an endpoint
pub trait WorkerConnector: Send + Sync {
    fn connect(&self, endpoint: WorkerEndpoint) -> Result<Arc<dyn WorkerApi>>;
}
