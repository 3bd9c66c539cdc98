//! MLPipe Core
//!
//! Core types shared by the MLPipe job client crates.
//!
//! This crate contains:
//! - Domain types: session phases, error records, job specs and results
//! - DTOs: request/response bodies for the controller and worker services

pub mod domain;
pub mod dto;
