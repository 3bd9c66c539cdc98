//! Data Transfer Objects for the controller and worker HTTP APIs

pub mod controller;
pub mod worker;
