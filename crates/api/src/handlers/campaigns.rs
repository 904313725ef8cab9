//! Handlers for the `/campaigns` resource: CRUD, the lock/unlock
//! operations, and starting a send.
//!
//! Message mutation is gated by the campaign lock: the caller must hold
//! a lock covering every affected message index. Acquisition is atomic
//! in the repository; these handlers only translate outcomes.

use std::collections::BTreeSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use validator::Validate;

use sandesh_core::campaign::CampaignStatus;
use sandesh_core::error::CoreError;
use sandesh_core::locking::{scope_covers, scopes_overlap, validate_scope, LockScope};
use sandesh_core::types::DbId;
use sandesh_db::models::campaign::{
    Campaign, CreateCampaignRequest, ReplaceMessagesRequest, UpdateCampaignRequest,
};
use sandesh_db::models::lock::{AcquireLockRequest, CampaignLock};
use sandesh_db::repositories::{
    AcquireOutcome, CampaignLockRepo, CampaignRepo, ContactListRepo, JobRepo, ReleaseOutcome,
};

use crate::error::{AppError, AppResult};
use crate::extract::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/campaigns
///
/// Create a campaign in `draft` status referencing an existing list.
pub async fn create_campaign(
    actor: Actor,
    State(state): State<AppState>,
    Json(input): Json<CreateCampaignRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    if ContactListRepo::find_by_id(&state.pool, input.list_id)
        .await?
        .is_none()
    {
        return Err(CoreError::NotFound {
            entity: "Contact list",
            id: input.list_id,
        }
        .into());
    }

    let campaign =
        CampaignRepo::create(&state.pool, &input.name, input.list_id, &input.messages).await?;

    tracing::info!(
        campaign_id = campaign.id,
        actor = %actor.0,
        list_id = input.list_id,
        messages = input.messages.len(),
        "Campaign created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: campaign })))
}

/// GET /api/v1/campaigns
pub async fn list_campaigns(
    _actor: Actor,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let campaigns = CampaignRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: campaigns }))
}

/// GET /api/v1/campaigns/{id}
pub async fn get_campaign(
    _actor: Actor,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let campaign = find_campaign(&state, campaign_id).await?;
    Ok(Json(DataResponse { data: campaign }))
}

/// PUT /api/v1/campaigns/{id}
///
/// Update name and/or list reference. Refused while a send is active.
pub async fn update_campaign(
    actor: Actor,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
    Json(input): Json<UpdateCampaignRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let campaign = find_campaign(&state, campaign_id).await?;
    ensure_not_sending(&campaign)?;

    if let Some(list_id) = input.list_id {
        if ContactListRepo::find_by_id(&state.pool, list_id)
            .await?
            .is_none()
        {
            return Err(CoreError::NotFound {
                entity: "Contact list",
                id: list_id,
            }
            .into());
        }
    }

    let updated = CampaignRepo::update_metadata(
        &state.pool,
        campaign_id,
        input.name.as_deref(),
        input.list_id,
    )
    .await?
    .ok_or(missing_campaign(campaign_id))?;

    tracing::info!(campaign_id, actor = %actor.0, "Campaign updated");
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/campaigns/{id}
///
/// Refused while a send is active or another actor holds a lock.
pub async fn delete_campaign(
    actor: Actor,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let campaign = find_campaign(&state, campaign_id).await?;
    ensure_not_sending(&campaign)?;

    let locks = CampaignLockRepo::active_locks(&state.pool, campaign_id).await?;
    if let Some(other) = locks.iter().find(|lock| lock.holder != actor.0) {
        return Err(CoreError::LockConflict {
            holder: other.holder.clone(),
            acquired_at: other.acquired_at,
        }
        .into());
    }

    CampaignRepo::delete(&state.pool, campaign_id).await?;
    tracing::info!(campaign_id, actor = %actor.0, "Campaign deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// PUT /api/v1/campaigns/{id}/messages
///
/// Replace the message array. The caller must hold a lock covering
/// every affected index: changing the array length affects the whole
/// campaign, while an in-place edit only needs the changed indices.
pub async fn replace_messages(
    actor: Actor,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
    Json(input): Json<ReplaceMessagesRequest>,
) -> AppResult<impl IntoResponse> {
    let campaign = find_campaign(&state, campaign_id).await?;
    ensure_not_sending(&campaign)?;

    let old = &campaign.messages.0;
    let required = if old.len() != input.messages.len() {
        LockScope::WholeCampaign
    } else {
        let changed: BTreeSet<usize> = (0..old.len())
            .filter(|&i| old[i] != input.messages[i])
            .collect();
        if changed.is_empty() {
            // Nothing to do.
            return Ok(Json(DataResponse { data: campaign }));
        }
        LockScope::Messages { indices: changed }
    };

    let locks = CampaignLockRepo::active_locks(&state.pool, campaign_id).await?;
    ensure_covering_lock(&locks, &actor.0, &required)?;

    let updated = CampaignRepo::replace_messages(&state.pool, campaign_id, &input.messages)
        .await?
        .ok_or(missing_campaign(campaign_id))?;

    tracing::info!(
        campaign_id,
        actor = %actor.0,
        messages = input.messages.len(),
        "Campaign messages replaced",
    );
    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Lock / unlock
// ---------------------------------------------------------------------------

/// POST /api/v1/campaigns/{id}/lock
///
/// Acquire an exclusive lock over the campaign or a message subset.
/// Re-entrant for the same actor; 409 with the holder's identity when a
/// different actor holds an overlapping scope.
pub async fn acquire_lock(
    actor: Actor,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
    Json(input): Json<AcquireLockRequest>,
) -> AppResult<impl IntoResponse> {
    let campaign = find_campaign(&state, campaign_id).await?;
    validate_scope(&input.scope, campaign.messages.0.len())
        .map_err(CoreError::Validation)?;

    let outcome = CampaignLockRepo::acquire(
        &state.pool,
        campaign_id,
        &actor.0,
        &input.scope,
        state.config.lock_ttl_mins,
    )
    .await?
    .ok_or(missing_campaign(campaign_id))?;

    match outcome {
        AcquireOutcome::Acquired(lock) => {
            tracing::info!(campaign_id, actor = %actor.0, "Campaign lock acquired");
            Ok(Json(DataResponse { data: lock }))
        }
        AcquireOutcome::Conflict {
            holder,
            acquired_at,
        } => Err(CoreError::LockConflict {
            holder,
            acquired_at,
        }
        .into()),
    }
}

/// POST /api/v1/campaigns/{id}/unlock
///
/// Release the caller's lock(s). Releasing when nothing is locked is an
/// idempotent success; releasing someone else's lock is refused.
pub async fn release_lock(
    actor: Actor,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outcome = CampaignLockRepo::release(&state.pool, campaign_id, &actor.0)
        .await?
        .ok_or(missing_campaign(campaign_id))?;

    let released = match outcome {
        ReleaseOutcome::Released => {
            tracing::info!(campaign_id, actor = %actor.0, "Campaign lock released");
            true
        }
        ReleaseOutcome::NoLockHeld => false,
        ReleaseOutcome::HeldByOther { holder, .. } => {
            return Err(CoreError::Conflict(format!(
                "Lock is held by {holder}; only the holder can release it"
            ))
            .into());
        }
    };

    Ok(Json(DataResponse {
        data: serde_json::json!({ "released": released }),
    }))
}

/// Response for `GET /campaigns/{id}/lock`.
#[derive(Debug, Serialize)]
pub struct LockStatusResponse {
    pub locked: bool,
    /// Active locks, oldest first (empty when unlocked).
    pub holders: Vec<CampaignLock>,
}

/// GET /api/v1/campaigns/{id}/lock
///
/// Current lock status with the active holders.
pub async fn get_lock_status(
    _actor: Actor,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_campaign(&state, campaign_id).await?;
    let locked = CampaignLockRepo::is_locked(&state.pool, campaign_id).await?;
    let holders = CampaignLockRepo::active_locks(&state.pool, campaign_id).await?;
    Ok(Json(DataResponse {
        data: LockStatusResponse { locked, holders },
    }))
}

// ---------------------------------------------------------------------------
// Send
// ---------------------------------------------------------------------------

/// POST /api/v1/campaigns/{id}/send
///
/// Start a send: requires a whole-campaign lock held by the caller.
/// Creates the dispatch job and moves the campaign to `sending`.
pub async fn send_campaign(
    actor: Actor,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let campaign = find_campaign(&state, campaign_id).await?;

    let status = campaign.parsed_status()?;
    if !status.can_start_send() {
        return Err(CoreError::Conflict(format!(
            "Campaign cannot be sent from status '{status}'"
        ))
        .into());
    }

    let locks = CampaignLockRepo::active_locks(&state.pool, campaign_id).await?;
    ensure_covering_lock(&locks, &actor.0, &LockScope::WholeCampaign)?;

    let contacts = ContactListRepo::contacts_for(&state.pool, campaign.list_id).await?;
    let job = state.orchestrator.start_send(&campaign, &contacts).await?;

    tracing::info!(
        campaign_id,
        job_id = job.id,
        actor = %actor.0,
        recipients = contacts.len(),
        "Campaign send started",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: job })))
}

/// GET /api/v1/campaigns/{id}/jobs
///
/// All send attempts for a campaign, newest first.
pub async fn list_campaign_jobs(
    _actor: Actor,
    State(state): State<AppState>,
    Path(campaign_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_campaign(&state, campaign_id).await?;
    let jobs = JobRepo::list_by_campaign(&state.pool, campaign_id).await?;
    Ok(Json(DataResponse { data: jobs }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_campaign(state: &AppState, campaign_id: DbId) -> Result<Campaign, AppError> {
    CampaignRepo::find_by_id(&state.pool, campaign_id)
        .await?
        .ok_or_else(|| missing_campaign(campaign_id).into())
}

fn missing_campaign(campaign_id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Campaign",
        id: campaign_id,
    }
}

/// Mutations are refused while a send is active.
fn ensure_not_sending(campaign: &Campaign) -> Result<(), AppError> {
    if campaign.parsed_status()? == CampaignStatus::Sending {
        return Err(CoreError::Conflict(
            "Campaign is currently sending and cannot be modified".to_string(),
        )
        .into());
    }
    Ok(())
}

/// The caller must hold an active lock covering `required`.
///
/// A foreign overlapping lock surfaces as `LockConflict` with the
/// holder's identity; otherwise the caller simply has not locked yet.
fn ensure_covering_lock(
    locks: &[CampaignLock],
    actor: &str,
    required: &LockScope,
) -> Result<(), AppError> {
    if locks
        .iter()
        .any(|lock| lock.holder == actor && scope_covers(&lock.scope.0, required))
    {
        return Ok(());
    }

    if let Some(other) = locks
        .iter()
        .find(|lock| lock.holder != actor && scopes_overlap(&lock.scope.0, required))
    {
        return Err(CoreError::LockConflict {
            holder: other.holder.clone(),
            acquired_at: other.acquired_at,
        }
        .into());
    }

    Err(CoreError::Conflict(
        "Acquire a lock covering the affected messages first".to_string(),
    )
    .into())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use sqlx::types::Json;

    use super::*;

    fn lock(holder: &str, scope: LockScope) -> CampaignLock {
        let now = chrono::Utc::now();
        CampaignLock {
            id: 1,
            campaign_id: 1,
            holder: holder.to_string(),
            scope: Json(scope),
            acquired_at: now,
            expires_at: now,
            released_at: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_own_covering_lock_passes() {
        let locks = vec![lock("alice", LockScope::WholeCampaign)];
        assert!(ensure_covering_lock(&locks, "alice", &LockScope::messages([1])).is_ok());
    }

    #[test]
    fn test_foreign_overlap_is_lock_conflict() {
        let locks = vec![lock("bob", LockScope::messages([1, 2]))];
        let err = ensure_covering_lock(&locks, "alice", &LockScope::messages([2]))
            .unwrap_err();
        assert_matches!(
            err,
            AppError::Core(CoreError::LockConflict { holder, .. }) if holder == "bob"
        );
    }

    #[test]
    fn test_no_lock_at_all_is_plain_conflict() {
        let err =
            ensure_covering_lock(&[], "alice", &LockScope::WholeCampaign).unwrap_err();
        assert_matches!(err, AppError::Core(CoreError::Conflict(_)));
    }

    #[test]
    fn test_own_partial_lock_does_not_cover_whole() {
        let locks = vec![lock("alice", LockScope::messages([0]))];
        let err = ensure_covering_lock(&locks, "alice", &LockScope::WholeCampaign)
            .unwrap_err();
        assert_matches!(err, AppError::Core(CoreError::Conflict(_)));
    }
}
