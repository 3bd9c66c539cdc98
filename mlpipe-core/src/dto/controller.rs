//! Controller API bodies

use serde::{Deserialize, Serialize};

use crate::domain::job::{JobSpec, SessionToken};

/// Response of `GET /api/fetchtoken`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: SessionToken,
}

/// Response of `GET /api/pollstatus`
///
/// The controller answers `null` for tokens it does not know.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: Option<String>,
}

/// Body of `POST /api/postjob/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostJobRequest {
    pub session_token: SessionToken,
    pub job_spec: JobSpec,
}

/// Response of `GET /api/getworkerport`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerPortResponse {
    #[serde(rename = "workerPort")]
    pub worker_port: i64,
}

/// Response of `GET /api`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PingResponse {
    pub message: String,
}
