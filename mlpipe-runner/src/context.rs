//! Per-session state
//!
//! One `SessionContext` exists per submission. It is owned by the
//! session's scheduler task and only mutated inside a tick, so it needs
//! no locking; callers observe it through published snapshots.

use mlpipe_core::domain::error::ErrorRecord;
use mlpipe_core::domain::job::{JobSpec, ResultDocument, SessionToken, WorkerEndpoint};
use mlpipe_core::domain::phase::Phase;
use mlpipe_core::domain::session::{SessionId, SessionStatus};
use tracing::warn;

use crate::dataset::Dataset;

/// Identifiers and mutable status of one submission
#[derive(Debug)]
pub struct SessionContext {
    pub id: SessionId,

    /// Set once by the first successful token request
    pub token: Option<SessionToken>,

    pub job_spec: JobSpec,
    pub dataset: Dataset,

    /// Set once, when the controller reports the worker port
    pub worker_endpoint: Option<WorkerEndpoint>,

    pub current_phase: Phase,

    /// Phase whose action has already been dispatched
    pub last_handled_phase: Option<Phase>,

    pub result: Option<ResultDocument>,
    pub last_error: Option<ErrorRecord>,
    pub consecutive_failures: u32,
}

impl SessionContext {
    pub fn new(id: SessionId, job_spec: JobSpec, dataset: Dataset) -> Self {
        Self {
            id,
            token: None,
            job_spec,
            dataset,
            worker_endpoint: None,
            current_phase: Phase::Uninitialized,
            last_handled_phase: None,
            result: None,
            last_error: None,
            consecutive_failures: 0,
        }
    }

    /// Stores the session token; later calls are ignored
    pub fn set_token(&mut self, token: SessionToken) {
        if self.token.is_some() {
            warn!("Session {} already has a token, ignoring {}", self.id, token);
            return;
        }
        self.token = Some(token);
    }

    /// Stores the worker endpoint; later calls are ignored
    pub fn assign_worker(&mut self, endpoint: WorkerEndpoint) -> WorkerEndpoint {
        match self.worker_endpoint {
            Some(existing) => {
                if existing != endpoint {
                    warn!(
                        "Session {} already bound to {}, ignoring {}",
                        self.id, existing, endpoint
                    );
                }
                existing
            }
            None => {
                self.worker_endpoint = Some(endpoint);
                endpoint
            }
        }
    }

    pub fn snapshot(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id,
            phase: self.current_phase,
            last_error: self.last_error.clone(),
            token: self.token.clone(),
            worker_endpoint: self.worker_endpoint,
            consecutive_failures: self.consecutive_failures,
        }
    }
}
