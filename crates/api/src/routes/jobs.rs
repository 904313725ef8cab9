//! Route definitions for dispatch jobs.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::jobs;
use crate::state::AppState;

/// Job routes mounted at `/jobs`.
///
/// ```text
/// GET  /health        -> worker_health (send-worker liveness)
/// GET  /{id}          -> get_job (status relay, optional long poll)
/// POST /{id}/cancel   -> cancel_job (idempotent)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(jobs::worker_health))
        .route("/{id}", get(jobs::get_job))
        .route("/{id}/cancel", post(jobs::cancel_job))
}
