//! Session phase

use serde::{Deserialize, Serialize};

/// Phase of one job submission
///
/// The controller reports all of these except `Error` and `Cancelled`,
/// which are only ever set locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Uninitialized,
    TokenPending,
    PendingJob,
    PendingDataTransfer,
    PendingResponseFetch,
    Finished,
    Killed,
    Error,
    Cancelled,
}

impl Phase {
    /// Parses a status string as reported by the controller
    ///
    /// Returns `None` for anything outside the controller's vocabulary,
    /// including the local-only `ERROR` and `CANCELLED` values.
    pub fn from_wire(status: &str) -> Option<Self> {
        match status {
            "UNINITIALIZED" => Some(Phase::Uninitialized),
            "TOKEN_PENDING" => Some(Phase::TokenPending),
            "PENDING_JOB" => Some(Phase::PendingJob),
            "PENDING_DATA_TRANSFER" => Some(Phase::PendingDataTransfer),
            "PENDING_RESPONSE_FETCH" => Some(Phase::PendingResponseFetch),
            "FINISHED" => Some(Phase::Finished),
            "KILLED" => Some(Phase::Killed),
            _ => None,
        }
    }

    /// The wire spelling of this phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Uninitialized => "UNINITIALIZED",
            Phase::TokenPending => "TOKEN_PENDING",
            Phase::PendingJob => "PENDING_JOB",
            Phase::PendingDataTransfer => "PENDING_DATA_TRANSFER",
            Phase::PendingResponseFetch => "PENDING_RESPONSE_FETCH",
            Phase::Finished => "FINISHED",
            Phase::Killed => "KILLED",
            Phase::Error => "ERROR",
            Phase::Cancelled => "CANCELLED",
        }
    }

    /// Whether the session can never leave this phase
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Phase::Finished | Phase::Killed | Phase::Error | Phase::Cancelled
        )
    }

    /// Position on the forward path; `None` for the sideways exits
    fn rank(&self) -> Option<u8> {
        match self {
            Phase::Uninitialized => Some(0),
            Phase::TokenPending => Some(1),
            Phase::PendingJob => Some(2),
            Phase::PendingDataTransfer => Some(3),
            Phase::PendingResponseFetch => Some(4),
            Phase::Finished => Some(5),
            Phase::Killed | Phase::Error | Phase::Cancelled => None,
        }
    }

    /// Whether moving from `self` to `next` keeps the phase order monotonic
    ///
    /// Staying put is allowed. Terminal phases admit nothing, and the
    /// sideways exits (`Killed`, `Error`, `Cancelled`) are reachable from
    /// any non-terminal phase.
    pub fn can_advance_to(&self, next: Phase) -> bool {
        if self.is_terminal() {
            return *self == next;
        }
        match (self.rank(), next.rank()) {
            (Some(current), Some(next)) => next >= current,
            _ => true,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
