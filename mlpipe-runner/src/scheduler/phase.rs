//! Phase state machine
//!
//! Interprets the status reported by the controller, decides the single
//! action to take for it and keeps the local phase monotonic. All failure
//! accounting for a session also lives here.

use mlpipe_core::domain::error::{ErrorKind, ErrorRecord};
use mlpipe_core::domain::phase::Phase;
use tracing::{debug, error, info, warn};

use crate::context::SessionContext;
use crate::error::OrchestratorError;

/// What a tick should do after observing a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do this tick
    Wait,
    PostJob,
    TransferDataset,
    FetchResults,
    /// The session is over; stop polling
    Terminate,
}

impl Action {
    fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::PendingJob => Action::PostJob,
            Phase::PendingDataTransfer => Action::TransferDataset,
            Phase::PendingResponseFetch => Action::FetchResults,
            Phase::Finished | Phase::Killed | Phase::Error | Phase::Cancelled => Action::Terminate,
            Phase::Uninitialized | Phase::TokenPending => Action::Wait,
        }
    }

    /// Whether this action has a remote side effect
    pub fn is_side_effect(&self) -> bool {
        matches!(
            self,
            Action::PostJob | Action::TransferDataset | Action::FetchResults
        )
    }
}

/// Maps reported statuses to actions for one session
#[derive(Debug, Clone)]
pub struct PhaseController {
    max_consecutive_failures: u32,
}

impl PhaseController {
    pub fn new(max_consecutive_failures: u32) -> Self {
        Self {
            max_consecutive_failures,
        }
    }

    /// Marks the session as waiting for its token
    pub fn begin_token_request(&self, ctx: &mut SessionContext) {
        if ctx.current_phase == Phase::Uninitialized {
            ctx.current_phase = Phase::TokenPending;
        }
    }

    /// Decides the action for a reported status
    ///
    /// The phase is recorded as handled before the action runs, so a slow
    /// action is never dispatched twice. A reported status equal to the
    /// handled phase yields [`Action::Wait`].
    pub fn handle(&self, reported: &str, ctx: &mut SessionContext) -> Action {
        if ctx.current_phase.is_terminal() {
            return Action::Terminate;
        }

        let Some(phase) = Phase::from_wire(reported) else {
            let record = ErrorRecord::new(
                ErrorKind::ProtocolMismatch,
                format!("Controller reported unknown status '{}'", reported),
                ctx.current_phase,
            );
            error!("Session {}: {}", ctx.id, record);
            self.fail(ctx, record);
            return Action::Terminate;
        };

        if ctx.last_handled_phase == Some(phase) {
            debug!("Session {}: {} already handled", ctx.id, phase);
            return Action::Wait;
        }

        if !ctx.current_phase.can_advance_to(phase) {
            warn!(
                "Session {}: ignoring regression from {} to {}",
                ctx.id, ctx.current_phase, phase
            );
            return Action::Wait;
        }

        if ctx.current_phase != phase {
            info!("Session {}: {} -> {}", ctx.id, ctx.current_phase, phase);
        }
        ctx.current_phase = phase;
        ctx.last_handled_phase = Some(phase);

        Action::for_phase(phase)
    }

    /// Clears the failure streak after a clean tick
    pub fn record_success(&self, ctx: &mut SessionContext) {
        if ctx.consecutive_failures > 0 {
            debug!(
                "Session {}: recovered after {} failure(s)",
                ctx.id, ctx.consecutive_failures
            );
        }
        ctx.consecutive_failures = 0;
    }

    /// Applies the retry policy to a failed call
    ///
    /// Fatal errors end the session at once. Transient errors are counted;
    /// a failed side effect also un-handles its phase so the next tick
    /// dispatches it again. Reaching the failure ceiling ends the session.
    ///
    /// # Arguments
    /// * `ctx` - The session
    /// * `err` - What went wrong
    /// * `during` - The action that failed, or `Wait` for token/status calls
    pub fn record_failure(&self, ctx: &mut SessionContext, err: &OrchestratorError, during: Action) {
        if ctx.current_phase.is_terminal() {
            return;
        }

        let kind = err.kind();
        let phase = ctx.current_phase;

        if !kind.is_transient() {
            let record = ErrorRecord::new(kind, err.to_string(), phase);
            error!("Session {}: fatal error: {}", ctx.id, record);
            self.fail(ctx, record);
            return;
        }

        ctx.consecutive_failures += 1;
        if during.is_side_effect() {
            ctx.last_handled_phase = None;
        }

        if ctx.consecutive_failures >= self.max_consecutive_failures {
            let kind = if during == Action::TransferDataset {
                ErrorKind::TransferFailure
            } else {
                kind
            };
            let record = ErrorRecord::new(
                kind,
                format!(
                    "{} (giving up after {} consecutive failures)",
                    err, ctx.consecutive_failures
                ),
                phase,
            );
            error!("Session {}: {}", ctx.id, record);
            self.fail(ctx, record);
        } else {
            warn!(
                "Session {}: transient failure {}/{} during {}: {}",
                ctx.id, ctx.consecutive_failures, self.max_consecutive_failures, phase, err
            );
            ctx.last_error = Some(ErrorRecord::new(kind, err.to_string(), phase));
        }
    }

    /// Moves a live session to `Cancelled`
    pub fn cancel(&self, ctx: &mut SessionContext) {
        if !ctx.current_phase.is_terminal() {
            info!("Session {}: cancelled during {}", ctx.id, ctx.current_phase);
            ctx.current_phase = Phase::Cancelled;
        }
    }

    fn fail(&self, ctx: &mut SessionContext, record: ErrorRecord) {
        ctx.current_phase = Phase::Error;
        ctx.last_error = Some(record);
    }
}
