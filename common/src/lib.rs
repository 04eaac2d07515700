//! Shared model and seams for the fingerprint dispatcher.
//!
//! Everything the orchestrator in `fphub-core` touches from the outside lives here:
//! the scan result aggregates it appends to, the probe target and probe result
//! values it passes between stages, and the collaborator traits it is wired with.

pub mod config;
pub mod error;
pub mod fingerprint;
pub mod network;
pub mod policy;
pub mod scan;
