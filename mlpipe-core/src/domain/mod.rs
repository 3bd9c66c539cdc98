//! Core domain types
//!
//! These types describe one job submission as seen by the client: the
//! phase it is in, what went wrong, and what came back from the worker.

pub mod error;
pub mod job;
pub mod phase;
pub mod session;
