//! Dispatch job model.

use serde::Serialize;
use sqlx::FromRow;

use sandesh_core::dispatch::JobState;
use sandesh_core::error::CoreError;
use sandesh_core::types::{DbId, Timestamp};

/// A row from the `dispatch_jobs` table: one execution attempt of
/// sending a campaign's messages via the external worker.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DispatchJob {
    pub id: DbId,
    pub campaign_id: DbId,
    /// The worker's own reference for this batch, once submitted.
    pub worker_ref: Option<String>,
    pub status: String,
    pub sent_count: i32,
    pub failed_count: i32,
    pub cancel_requested: bool,
    /// Summarized failure reason; never the worker's raw response.
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl DispatchJob {
    /// Parse the stored status string into the typed state.
    pub fn state(&self) -> Result<JobState, CoreError> {
        JobState::from_str(&self.status).ok_or_else(|| {
            CoreError::Internal(format!(
                "dispatch job {} has unknown status '{}'",
                self.id, self.status
            ))
        })
    }

    /// Terminal jobs are immutable except for being read.
    pub fn is_terminal(&self) -> bool {
        self.state().map(JobState::is_terminal).unwrap_or(false)
    }
}
