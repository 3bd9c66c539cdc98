//! Session identity and status snapshots

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ErrorRecord;
use super::job::{SessionToken, WorkerEndpoint};
use super::phase::Phase;

/// Local identifier of one submission
///
/// Distinct from the controller's token, which is only known once the
/// first poll tick has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Point-in-time copy of a session's observable state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatus {
    pub session_id: SessionId,
    pub phase: Phase,
    pub last_error: Option<ErrorRecord>,
    pub token: Option<SessionToken>,
    pub worker_endpoint: Option<WorkerEndpoint>,
    pub consecutive_failures: u32,
}

impl SessionStatus {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            phase: Phase::Uninitialized,
            last_error: None,
            token: None,
            worker_endpoint: None,
            consecutive_failures: 0,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }
}
