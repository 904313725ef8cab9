//! Handlers for the `/jobs` resource.
//!
//! Job status is pull-based: `GET /jobs/{id}` relays the worker's
//! current answer, and `?wait=true` turns the request into a bounded
//! long poll driven by the shared polling loop. Cancellation is
//! fire-and-forget and idempotent; the `cancelled` state shows up in a
//! later status read.

use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use sandesh_core::types::DbId;

use crate::error::AppResult;
use crate::extract::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

/// Default long-poll interval.
const DEFAULT_WAIT_INTERVAL_MS: u64 = 2_000;

/// Clamp bounds for the caller-supplied interval.
const MIN_WAIT_INTERVAL_MS: u64 = 250;
const MAX_WAIT_INTERVAL_MS: u64 = 10_000;

/// Query parameters for `GET /api/v1/jobs/{id}`.
#[derive(Debug, Deserialize)]
pub struct JobStatusQuery {
    /// When `true`, block until the job is terminal (bounded by the
    /// server's wait window) instead of returning immediately.
    #[serde(default)]
    pub wait: bool,
    /// Polling interval for `wait=true`, in milliseconds.
    pub interval_ms: Option<u64>,
}

/// GET /api/v1/jobs/{id}
///
/// Pull the job's current state from the worker. With `wait=true` the
/// handler polls on the caller's interval until the job is terminal or
/// the wait window closes (the latest stored state is returned then).
pub async fn get_job(
    _actor: Actor,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
    Query(query): Query<JobStatusQuery>,
) -> AppResult<impl IntoResponse> {
    let job = if query.wait {
        let interval = Duration::from_millis(
            query
                .interval_ms
                .unwrap_or(DEFAULT_WAIT_INTERVAL_MS)
                .clamp(MIN_WAIT_INTERVAL_MS, MAX_WAIT_INTERVAL_MS),
        );

        // The caller owns the pace; the server only bounds the total
        // wait so the request finishes before the HTTP timeout.
        let cancel = CancellationToken::new();
        let deadline = cancel.clone();
        let wait_window = Duration::from_secs(state.config.status_wait_secs);
        tokio::spawn(async move {
            tokio::time::sleep(wait_window).await;
            deadline.cancel();
        });

        state.orchestrator.watch(job_id, interval, &cancel).await?
    } else {
        state.orchestrator.status(job_id).await?
    };

    Ok(Json(DataResponse { data: job }))
}

/// POST /api/v1/jobs/{id}/cancel
///
/// Request cancellation. Always succeeds for an existing job, including
/// repeat calls and calls on already-terminal jobs (no-op). The actual
/// `cancelled` transition is observed later via status.
pub async fn cancel_job(
    actor: Actor,
    State(state): State<AppState>,
    Path(job_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let job = state.orchestrator.cancel(job_id).await?;

    tracing::info!(job_id, actor = %actor.0, status = %job.status, "Job cancel requested");
    Ok(Json(DataResponse { data: job }))
}

/// Response payload for the worker liveness probe.
#[derive(Debug, Serialize)]
pub struct WorkerHealthResponse {
    /// Whether the send worker answered its health endpoint.
    pub worker_healthy: bool,
}

/// GET /api/v1/jobs/health
///
/// Liveness probe of the send worker, independent of any job.
pub async fn worker_health(
    _actor: Actor,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let worker_healthy = state.orchestrator.health().await;
    Ok(Json(DataResponse {
        data: WorkerHealthResponse { worker_healthy },
    }))
}
