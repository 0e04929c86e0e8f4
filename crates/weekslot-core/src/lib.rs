//! Shared settings, error types and identifiers for the weekslot workspace.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
