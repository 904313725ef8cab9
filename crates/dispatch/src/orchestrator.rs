//! The job orchestrator: a thin, faithful relay between the campaign
//! store and the external send worker.
//!
//! The worker is the authority on job state. The orchestrator submits
//! batches, polls on demand, persists what it observed through the
//! guarded transitions in [`JobRepo`], and propagates terminal outcomes
//! back to the owning campaign (status + lock release). It never
//! invents a state and never retries internally.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use sandesh_core::campaign::CampaignStatus;
use sandesh_core::dispatch::JobState;
use sandesh_core::error::CoreError;
use sandesh_core::types::DbId;
use sandesh_db::models::campaign::Campaign;
use sandesh_db::models::contact_list::ContactRow;
use sandesh_db::models::job::DispatchJob;
use sandesh_db::repositories::{CampaignLockRepo, CampaignRepo, JobRepo};
use sandesh_db::DbPool;

use crate::client::{SendWorker, WorkerApiError};
use crate::poll::poll_until_terminal;
use crate::wire::{BatchStatusResponse, BatchSubmission, Recipient};

/// Errors from orchestrator operations.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// A domain-level error (not found, validation, upstream, ...).
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Creates, polls, and cancels dispatch jobs against the send worker.
///
/// Created once at application startup; the returned `Arc` is cheaply
/// cloned into request handlers.
pub struct JobOrchestrator {
    pool: DbPool,
    worker: Arc<dyn SendWorker>,
}

impl JobOrchestrator {
    pub fn new(pool: DbPool, worker: Arc<dyn SendWorker>) -> Arc<Self> {
        Arc::new(Self { pool, worker })
    }

    /// Start a send: create the job row, hand the batch to the worker,
    /// and move the campaign to `sending`.
    ///
    /// If the worker rejects or never receives the submission the job
    /// row is closed as `failed` (the worker never owned it) and the
    /// caller sees the upstream error.
    pub async fn start_send(
        &self,
        campaign: &Campaign,
        contacts: &[ContactRow],
    ) -> Result<DispatchJob, OrchestratorError> {
        if contacts.is_empty() {
            return Err(CoreError::Validation(
                "Cannot send a campaign with an empty contact list".to_string(),
            )
            .into());
        }
        if campaign.messages.0.is_empty() {
            return Err(CoreError::Validation(
                "Cannot send a campaign with no messages".to_string(),
            )
            .into());
        }

        let batch = BatchSubmission {
            recipients: contacts
                .iter()
                .map(|c| Recipient {
                    phone: c.phone.clone(),
                    name: c.name.clone(),
                })
                .collect(),
            messages: campaign.messages.0.iter().map(|m| m.body.clone()).collect(),
        };

        let job = JobRepo::create(&self.pool, campaign.id).await?;

        match self.worker.submit(&batch).await {
            Ok(response) => {
                JobRepo::set_worker_ref(&self.pool, job.id, &response.batch_id).await?;
                CampaignRepo::set_status(&self.pool, campaign.id, CampaignStatus::Sending)
                    .await?;

                tracing::info!(
                    job_id = job.id,
                    campaign_id = campaign.id,
                    batch_id = %response.batch_id,
                    recipients = batch.recipients.len(),
                    "Batch submitted to send worker",
                );

                JobRepo::find_by_id(&self.pool, job.id)
                    .await?
                    .ok_or_else(|| missing_job(job.id).into())
            }
            Err(err) => {
                let summary = summarize(&err);
                tracing::error!(
                    job_id = job.id,
                    campaign_id = campaign.id,
                    error = %err,
                    "Batch submission failed",
                );
                JobRepo::record_observed_state(
                    &self.pool,
                    job.id,
                    JobState::Failed,
                    0,
                    0,
                    Some(&format!("submission failed: {summary}")),
                )
                .await?;
                Err(CoreError::Upstream(summary).into())
            }
        }
    }

    /// Pull the current state of a job.
    ///
    /// Terminal rows are served from the store (terminal states are
    /// immutable). Otherwise the worker is polled, the observation is
    /// persisted, and terminal outcomes propagate to the campaign.
    pub async fn status(&self, job_id: DbId) -> Result<DispatchJob, OrchestratorError> {
        let job = self.find_job(job_id).await?;
        if job.is_terminal() {
            return Ok(job);
        }

        let Some(reference) = job.worker_ref.clone() else {
            // Submission never completed; nothing to poll yet.
            tracing::warn!(job_id, "Job has no worker reference; returning stored state");
            return Ok(job);
        };

        match self.worker.status(&reference).await {
            Ok(observed) => self.record(&job, &observed).await,
            Err(err) => {
                tracing::warn!(job_id, error = %err, "Send worker status poll failed");
                Err(CoreError::Upstream(summarize(&err)).into())
            }
        }
    }

    /// Pull repeatedly until the job is terminal, on the caller's
    /// interval, stopping early when `cancel` fires (in which case the
    /// latest stored row is returned).
    pub async fn watch(
        &self,
        job_id: DbId,
        interval: Duration,
        cancel: &CancellationToken,
    ) -> Result<DispatchJob, OrchestratorError> {
        let job = self.find_job(job_id).await?;
        if job.is_terminal() {
            return Ok(job);
        }

        let Some(reference) = job.worker_ref.clone() else {
            return Ok(job);
        };

        match poll_until_terminal(self.worker.as_ref(), &reference, interval, cancel).await {
            Ok(Some(observed)) => self.record(&job, &observed).await,
            // Caller gave up; hand back whatever is stored.
            Ok(None) => self.find_job(job_id).await,
            Err(err) => {
                tracing::warn!(job_id, error = %err, "Send worker status poll failed");
                Err(CoreError::Upstream(summarize(&err)).into())
            }
        }
    }

    /// Request cancellation of a job.
    ///
    /// Idempotent: cancelling a terminal job (or one already flagged)
    /// is a no-op success. The signal is forwarded to the worker on a
    /// best-effort basis; the actual `cancelled` transition is observed
    /// later via [`Self::status`].
    pub async fn cancel(&self, job_id: DbId) -> Result<DispatchJob, OrchestratorError> {
        let job = self.find_job(job_id).await?;
        if job.is_terminal() {
            return Ok(job);
        }

        let flagged = JobRepo::request_cancel(&self.pool, job_id)
            .await?
            .ok_or_else(|| missing_job(job_id))?;

        // Fire-and-forget: the caller gets its answer now, the signal
        // travels on its own, and the cancelled state is observed later.
        if let Some(reference) = flagged.worker_ref.clone() {
            let worker = Arc::clone(&self.worker);
            tokio::spawn(async move {
                if let Err(err) = worker.cancel(&reference).await {
                    tracing::warn!(
                        job_id,
                        error = %err,
                        "Failed to forward cancel signal (job stays flagged; worker will be re-polled)",
                    );
                }
            });
        }

        tracing::info!(job_id, "Job cancellation requested");
        Ok(flagged)
    }

    /// Liveness probe of the send worker.
    pub async fn health(&self) -> bool {
        self.worker.health().await
    }

    // ---- private helpers ----

    async fn find_job(&self, job_id: DbId) -> Result<DispatchJob, OrchestratorError> {
        JobRepo::find_by_id(&self.pool, job_id)
            .await?
            .ok_or_else(|| missing_job(job_id).into())
    }

    /// Persist an observed worker status and propagate terminal
    /// outcomes to the owning campaign.
    async fn record(
        &self,
        job: &DispatchJob,
        observed: &BatchStatusResponse,
    ) -> Result<DispatchJob, OrchestratorError> {
        let error_message = observed
            .error
            .as_deref()
            .map(|_| "send worker reported a delivery failure");

        let updated = JobRepo::record_observed_state(
            &self.pool,
            job.id,
            observed.state.to_job_state(),
            observed.sent,
            observed.failed,
            error_message,
        )
        .await?
        .ok_or_else(|| missing_job(job.id))?;

        if !job.is_terminal() && updated.is_terminal() {
            self.finish_campaign(&updated).await?;
        }

        Ok(updated)
    }

    /// A send attempt ended: settle the campaign status and release its
    /// locks.
    async fn finish_campaign(&self, job: &DispatchJob) -> Result<(), OrchestratorError> {
        let next = match job.state()? {
            JobState::Completed => CampaignStatus::Completed,
            JobState::Cancelled => CampaignStatus::Cancelled,
            // The attempt is over; the campaign goes back to editable.
            JobState::Failed => CampaignStatus::Draft,
            JobState::Queued | JobState::Running => return Ok(()),
        };

        CampaignRepo::set_status_if(
            &self.pool,
            job.campaign_id,
            CampaignStatus::Sending,
            next,
        )
        .await?;
        let released = CampaignLockRepo::release_all(&self.pool, job.campaign_id).await?;

        tracing::info!(
            job_id = job.id,
            campaign_id = job.campaign_id,
            status = %job.status,
            released_locks = released,
            "Campaign send finished",
        );
        Ok(())
    }
}

/// Summarize a worker error for the caller. The raw error goes to the
/// logs; callers only ever see this.
fn summarize(err: &WorkerApiError) -> String {
    match err {
        WorkerApiError::Unreachable(_) => "request failed or timed out".to_string(),
        WorkerApiError::Api { status, .. } => format!("worker returned HTTP {status}"),
    }
}

fn missing_job(job_id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Job",
        id: job_id,
    }
}
