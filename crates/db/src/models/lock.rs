//! Campaign lock model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

use sandesh_core::locking::LockScope;
use sandesh_core::types::{DbId, Timestamp};

/// A row from the `campaign_locks` table: the persisted record of who
/// currently holds exclusive rights over (part of) a campaign.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CampaignLock {
    pub id: DbId,
    pub campaign_id: DbId,
    /// Actor identifier supplied by the caller (opaque to this system).
    pub holder: String,
    pub scope: Json<LockScope>,
    pub acquired_at: Timestamp,
    pub expires_at: Timestamp,
    pub released_at: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /campaigns/{id}/lock`.
#[derive(Debug, Deserialize)]
pub struct AcquireLockRequest {
    pub scope: LockScope,
}
