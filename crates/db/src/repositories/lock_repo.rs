//! Repository for the `campaign_locks` table.
//!
//! Acquisition is a compare-and-set serialized by a row-level lock on
//! the campaign row (`SELECT ... FOR UPDATE`), so two simultaneous
//! acquires on the same campaign never both succeed for different
//! actors. Expired locks are cleaned up lazily inside the same
//! transactions; there is no background sweeper.

use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};

use sandesh_core::locking::{scopes_overlap, LockScope};
use sandesh_core::types::{DbId, Timestamp};

use crate::models::lock::CampaignLock;

/// Column list for `campaign_locks` queries.
const LOCK_COLUMNS: &str = "id, campaign_id, holder, scope, acquired_at, expires_at, \
                            released_at, is_active, created_at, updated_at";

/// Result of an acquire attempt on an existing campaign.
#[derive(Debug)]
pub enum AcquireOutcome {
    /// The lock was written; the caller now holds it.
    Acquired(CampaignLock),
    /// A different actor holds an overlapping scope.
    Conflict {
        holder: String,
        acquired_at: Timestamp,
    },
}

/// Result of a release attempt on an existing campaign.
#[derive(Debug)]
pub enum ReleaseOutcome {
    /// The caller's lock(s) were released.
    Released,
    /// Nothing was locked; release is an idempotent no-op.
    NoLockHeld,
    /// Only a different actor holds a lock; the caller cannot release it.
    HeldByOther {
        holder: String,
        acquired_at: Timestamp,
    },
}

/// Provides the exclusive-access operations over campaign locks.
pub struct CampaignLockRepo;

impl CampaignLockRepo {
    /// Attempt to acquire a lock on a campaign (or a message subset).
    ///
    /// Semantics:
    /// - Overlapping lock held by a different actor: `Conflict` with the
    ///   holder's identity and acquisition time.
    /// - Overlapping lock(s) held by the requesting actor: re-entrant,
    ///   they are replaced by the new lock (fresh timestamp, scope, TTL).
    /// - Otherwise the new lock row is inserted. Non-overlapping subset
    ///   locks held by other actors are untouched.
    ///
    /// Returns `None` if the campaign does not exist.
    pub async fn acquire(
        pool: &PgPool,
        campaign_id: DbId,
        holder: &str,
        scope: &LockScope,
        ttl_mins: i64,
    ) -> Result<Option<AcquireOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !Self::lock_campaign_row(&mut tx, campaign_id).await? {
            return Ok(None);
        }
        Self::expire_stale(&mut tx, campaign_id).await?;

        let active = Self::fetch_active(&mut tx, campaign_id).await?;

        if let Some(other) = active
            .iter()
            .find(|lock| lock.holder != holder && scopes_overlap(&lock.scope.0, scope))
        {
            let conflict = AcquireOutcome::Conflict {
                holder: other.holder.clone(),
                acquired_at: other.acquired_at,
            };
            // Keep the stale-lock cleanup even on the conflict path.
            tx.commit().await?;
            return Ok(Some(conflict));
        }

        // Re-entrant acquire: supersede this actor's overlapping locks.
        for own in active
            .iter()
            .filter(|lock| lock.holder == holder && scopes_overlap(&lock.scope.0, scope))
        {
            sqlx::query(
                "UPDATE campaign_locks \
                 SET is_active = false, released_at = NOW(), updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(own.id)
            .execute(&mut *tx)
            .await?;
        }

        let query = format!(
            "INSERT INTO campaign_locks (campaign_id, holder, scope, expires_at) \
             VALUES ($1, $2, $3, NOW() + ($4 || ' minutes')::interval) \
             RETURNING {LOCK_COLUMNS}"
        );
        let lock = sqlx::query_as::<_, CampaignLock>(&query)
            .bind(campaign_id)
            .bind(holder)
            .bind(Json(scope))
            .bind(ttl_mins.to_string())
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE campaigns SET status = 'locked', updated_at = NOW() \
             WHERE id = $1 AND status = 'draft'",
        )
        .bind(campaign_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(AcquireOutcome::Acquired(lock)))
    }

    /// Release the caller's lock(s) on a campaign.
    ///
    /// Returns `None` if the campaign does not exist.
    pub async fn release(
        pool: &PgPool,
        campaign_id: DbId,
        holder: &str,
    ) -> Result<Option<ReleaseOutcome>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if !Self::lock_campaign_row(&mut tx, campaign_id).await? {
            return Ok(None);
        }
        Self::expire_stale(&mut tx, campaign_id).await?;

        let released = sqlx::query(
            "UPDATE campaign_locks \
             SET is_active = false, released_at = NOW(), updated_at = NOW() \
             WHERE campaign_id = $1 AND holder = $2 AND is_active = true",
        )
        .bind(campaign_id)
        .bind(holder)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let remaining = Self::fetch_active(&mut tx, campaign_id).await?;

        let outcome = if released > 0 {
            ReleaseOutcome::Released
        } else if let Some(other) = remaining.first() {
            ReleaseOutcome::HeldByOther {
                holder: other.holder.clone(),
                acquired_at: other.acquired_at,
            }
        } else {
            ReleaseOutcome::NoLockHeld
        };

        if remaining.is_empty() {
            sqlx::query(
                "UPDATE campaigns SET status = 'draft', updated_at = NOW() \
                 WHERE id = $1 AND status = 'locked'",
            )
            .bind(campaign_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(outcome))
    }

    /// Currently active, unexpired locks for a campaign (read-only).
    pub async fn active_locks(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<CampaignLock>, sqlx::Error> {
        let query = format!(
            "SELECT {LOCK_COLUMNS} FROM campaign_locks \
             WHERE campaign_id = $1 AND is_active = true AND expires_at > NOW() \
             ORDER BY acquired_at",
        );
        sqlx::query_as::<_, CampaignLock>(&query)
            .bind(campaign_id)
            .fetch_all(pool)
            .await
    }

    /// Returns `true` if any actor currently holds an unexpired lock.
    pub async fn is_locked(pool: &PgPool, campaign_id: DbId) -> Result<bool, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM campaign_locks \
             WHERE campaign_id = $1 AND is_active = true AND expires_at > NOW()",
        )
        .bind(campaign_id)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }

    /// Release every active lock on a campaign regardless of holder.
    ///
    /// Used when a send reaches a terminal state. Returns the number of
    /// locks released.
    pub async fn release_all(pool: &PgPool, campaign_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaign_locks \
             SET is_active = false, released_at = NOW(), updated_at = NOW() \
             WHERE campaign_id = $1 AND is_active = true",
        )
        .bind(campaign_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    // ---- private helpers ----

    /// Take the row-level lock that serializes acquire/release for one
    /// campaign. Returns `false` if the campaign does not exist.
    async fn lock_campaign_row(
        tx: &mut Transaction<'_, Postgres>,
        campaign_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let row: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM campaigns WHERE id = $1 FOR UPDATE")
                .bind(campaign_id)
                .fetch_optional(&mut **tx)
                .await?;
        Ok(row.is_some())
    }

    /// Deactivate expired locks for a campaign (lazy TTL enforcement).
    async fn expire_stale(
        tx: &mut Transaction<'_, Postgres>,
        campaign_id: DbId,
    ) -> Result<(), sqlx::Error> {
        let expired = sqlx::query(
            "UPDATE campaign_locks \
             SET is_active = false, released_at = NOW(), updated_at = NOW() \
             WHERE campaign_id = $1 AND is_active = true AND expires_at < NOW()",
        )
        .bind(campaign_id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        if expired > 0 {
            tracing::info!(campaign_id, expired, "Expired stale campaign locks");
        }
        Ok(())
    }

    /// Active lock rows for a campaign inside the current transaction.
    async fn fetch_active(
        tx: &mut Transaction<'_, Postgres>,
        campaign_id: DbId,
    ) -> Result<Vec<CampaignLock>, sqlx::Error> {
        let query = format!(
            "SELECT {LOCK_COLUMNS} FROM campaign_locks \
             WHERE campaign_id = $1 AND is_active = true \
             ORDER BY acquired_at",
        );
        sqlx::query_as::<_, CampaignLock>(&query)
            .bind(campaign_id)
            .fetch_all(&mut **tx)
            .await
    }
}
