//! Send-worker integration: the HTTP client for the external message
//! dispatch worker, the pull-based status poller, and the
//! [`orchestrator::JobOrchestrator`] that relays job state between the
//! worker and the database.
//!
//! The worker is the authority on job state. Nothing in this crate
//! infers an outcome: state is observed by polling, persisted through
//! the guarded transitions in `sandesh-db`, and surfaced to callers.

pub mod client;
pub mod orchestrator;
pub mod poll;
pub mod wire;

pub use client::{HttpSendWorker, SendWorker, WorkerApiError};
pub use orchestrator::{JobOrchestrator, OrchestratorError};
