use std::sync::Arc;

use sandesh_dispatch::JobOrchestrator;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: sandesh_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Relay between the campaign store and the send worker.
    pub orchestrator: Arc<JobOrchestrator>,
}
