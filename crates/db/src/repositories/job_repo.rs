//! Repository for the `dispatch_jobs` table.
//!
//! Status writes are guarded by the state machine in
//! [`sandesh_core::dispatch`]: once a job row is terminal it never
//! changes again, no matter what a late worker response claims.

use sqlx::{PgPool, Postgres, Transaction};

use sandesh_core::dispatch::JobState;
use sandesh_core::types::DbId;

use crate::models::job::DispatchJob;

/// Column list for `dispatch_jobs` queries.
const JOB_COLUMNS: &str = "id, campaign_id, worker_ref, status, sent_count, failed_count, \
                           cancel_requested, error_message, created_at, started_at, completed_at";

/// Provides CRUD operations for dispatch jobs.
pub struct JobRepo;

impl JobRepo {
    /// Create a job in `queued` state for a campaign send attempt.
    pub async fn create(pool: &PgPool, campaign_id: DbId) -> Result<DispatchJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO dispatch_jobs (campaign_id) VALUES ($1) RETURNING {JOB_COLUMNS}"
        );
        sqlx::query_as::<_, DispatchJob>(&query)
            .bind(campaign_id)
            .fetch_one(pool)
            .await
    }

    /// Record the worker's reference after a successful submission.
    pub async fn set_worker_ref(
        pool: &PgPool,
        job_id: DbId,
        worker_ref: &str,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("UPDATE dispatch_jobs SET worker_ref = $2 WHERE id = $1")
                .bind(job_id)
                .bind(worker_ref)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Fetch a job by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        job_id: DbId,
    ) -> Result<Option<DispatchJob>, sqlx::Error> {
        let query = format!("SELECT {JOB_COLUMNS} FROM dispatch_jobs WHERE id = $1");
        sqlx::query_as::<_, DispatchJob>(&query)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }

    /// All send attempts for a campaign, newest first.
    pub async fn list_by_campaign(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<DispatchJob>, sqlx::Error> {
        let query = format!(
            "SELECT {JOB_COLUMNS} FROM dispatch_jobs \
             WHERE campaign_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, DispatchJob>(&query)
            .bind(campaign_id)
            .fetch_all(pool)
            .await
    }

    /// Persist a state observed from the worker, plus progress counters.
    ///
    /// Legal transitions are applied; observing the current state again
    /// just refreshes the counters. Anything that would move a terminal
    /// job, or take an illegal edge, is ignored and the stored row is
    /// returned unchanged. Returns `None` if the job does not exist.
    pub async fn record_observed_state(
        pool: &PgPool,
        job_id: DbId,
        observed: JobState,
        sent_count: i32,
        failed_count: i32,
        error_message: Option<&str>,
    ) -> Result<Option<DispatchJob>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {JOB_COLUMNS} FROM dispatch_jobs WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, DispatchJob>(&query)
            .bind(job_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let Some(current_state) = JobState::from_str(&current.status) else {
            // Unknown stored status; leave the row alone.
            tracing::error!(job_id, status = %current.status, "Unknown stored job status");
            return Ok(Some(current));
        };

        let updated = if current_state == observed && !current_state.is_terminal() {
            Self::refresh_counters(&mut tx, job_id, sent_count, failed_count).await?
        } else if current_state.can_transition_to(observed) {
            tracing::info!(
                job_id,
                from = %current_state,
                to = %observed,
                "Dispatch job transition",
            );
            Self::apply_transition(&mut tx, job_id, observed, sent_count, failed_count, error_message)
                .await?
        } else {
            if current_state != observed {
                tracing::warn!(
                    job_id,
                    from = %current_state,
                    to = %observed,
                    "Ignoring illegal job transition",
                );
            }
            current
        };

        tx.commit().await?;
        Ok(Some(updated))
    }

    /// Flag a job for cancellation. Terminal jobs are left untouched.
    ///
    /// Returns the (possibly unchanged) row, or `None` if missing.
    pub async fn request_cancel(
        pool: &PgPool,
        job_id: DbId,
    ) -> Result<Option<DispatchJob>, sqlx::Error> {
        let query = format!(
            "UPDATE dispatch_jobs SET cancel_requested = true \
             WHERE id = $1 AND status NOT IN ('completed', 'failed', 'cancelled') \
             RETURNING {JOB_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, DispatchJob>(&query)
            .bind(job_id)
            .fetch_optional(pool)
            .await?;

        match updated {
            Some(job) => Ok(Some(job)),
            // Terminal (or the row is gone): return whatever is stored.
            None => Self::find_by_id(pool, job_id).await,
        }
    }

    // ---- private helpers ----

    async fn refresh_counters(
        tx: &mut Transaction<'_, Postgres>,
        job_id: DbId,
        sent_count: i32,
        failed_count: i32,
    ) -> Result<DispatchJob, sqlx::Error> {
        let query = format!(
            "UPDATE dispatch_jobs SET sent_count = $2, failed_count = $3 \
             WHERE id = $1 \
             RETURNING {JOB_COLUMNS}"
        );
        sqlx::query_as::<_, DispatchJob>(&query)
            .bind(job_id)
            .bind(sent_count)
            .bind(failed_count)
            .fetch_one(&mut **tx)
            .await
    }

    async fn apply_transition(
        tx: &mut Transaction<'_, Postgres>,
        job_id: DbId,
        next: JobState,
        sent_count: i32,
        failed_count: i32,
        error_message: Option<&str>,
    ) -> Result<DispatchJob, sqlx::Error> {
        let query = format!(
            "UPDATE dispatch_jobs SET \
                 status = $2, \
                 sent_count = $3, \
                 failed_count = $4, \
                 error_message = COALESCE($5, error_message), \
                 started_at = CASE WHEN $2 = 'running' THEN COALESCE(started_at, NOW()) \
                                   ELSE started_at END, \
                 completed_at = CASE WHEN $2 IN ('completed', 'failed', 'cancelled') \
                                     THEN COALESCE(completed_at, NOW()) \
                                     ELSE completed_at END \
             WHERE id = $1 \
             RETURNING {JOB_COLUMNS}"
        );
        sqlx::query_as::<_, DispatchJob>(&query)
            .bind(job_id)
            .bind(next.as_str())
            .bind(sent_count)
            .bind(failed_count)
            .bind(error_message)
            .fetch_one(&mut **tx)
            .await
    }
}
