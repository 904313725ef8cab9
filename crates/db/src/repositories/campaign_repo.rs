//! Repository for the `campaigns` table.

use sqlx::types::Json;
use sqlx::PgPool;

use sandesh_core::campaign::{CampaignStatus, Message};
use sandesh_core::types::DbId;

use crate::models::campaign::Campaign;

/// Column list for `campaigns` queries.
const CAMPAIGN_COLUMNS: &str = "id, name, list_id, messages, status, created_at, updated_at";

/// Provides CRUD operations for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Create a campaign in `draft` status.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        list_id: DbId,
        messages: &[Message],
    ) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns (name, list_id, messages) \
             VALUES ($1, $2, $3) \
             RETURNING {CAMPAIGN_COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(name)
            .bind(list_id)
            .bind(Json(messages))
            .fetch_one(pool)
            .await
    }

    /// Fetch a campaign by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {CAMPAIGN_COLUMNS} FROM campaigns WHERE id = $1");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(campaign_id)
            .fetch_optional(pool)
            .await
    }

    /// List all campaigns, newest first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!(
            "SELECT {CAMPAIGN_COLUMNS} FROM campaigns ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Campaign>(&query).fetch_all(pool).await
    }

    /// Update name and/or list reference. Unset fields keep their value.
    pub async fn update_metadata(
        pool: &PgPool,
        campaign_id: DbId,
        name: Option<&str>,
        list_id: Option<DbId>,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET \
                 name = COALESCE($2, name), \
                 list_id = COALESCE($3, list_id), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {CAMPAIGN_COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(campaign_id)
            .bind(name)
            .bind(list_id)
            .fetch_optional(pool)
            .await
    }

    /// Replace the message array.
    pub async fn replace_messages(
        pool: &PgPool,
        campaign_id: DbId,
        messages: &[Message],
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns SET messages = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {CAMPAIGN_COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(campaign_id)
            .bind(Json(messages))
            .fetch_optional(pool)
            .await
    }

    /// Unconditionally set the campaign status.
    pub async fn set_status(
        pool: &PgPool,
        campaign_id: DbId,
        status: CampaignStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaigns SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(campaign_id)
        .bind(status.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the status only when the current status matches `from`.
    ///
    /// Returns `true` if the transition was applied. Used for guarded
    /// transitions (e.g. `sending -> completed`).
    pub async fn set_status_if(
        pool: &PgPool,
        campaign_id: DbId,
        from: CampaignStatus,
        to: CampaignStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE campaigns SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $2",
        )
        .bind(campaign_id)
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a campaign. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, campaign_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1")
            .bind(campaign_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of campaigns referencing a contact list. Used to refuse
    /// list deletion with a friendly conflict error.
    pub async fn count_referencing_list(
        pool: &PgPool,
        list_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM campaigns WHERE list_id = $1")
                .bind(list_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
