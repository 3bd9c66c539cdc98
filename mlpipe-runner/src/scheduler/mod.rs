//! Scheduler layer
//!
//! Drives one session from submission to a terminal phase: a timed poll
//! loop ([`PollScheduler`]) feeding controller statuses into the phase
//! state machine ([`PhaseController`]).

pub mod phase;
pub mod poller;

pub use phase::{Action, PhaseController};
pub use poller::{PollScheduler, SchedulerHandle, SessionView};
