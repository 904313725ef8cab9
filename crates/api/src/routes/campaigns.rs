//! Route definitions for campaigns, their locks, and sends.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::campaigns;
use crate::state::AppState;

/// Campaign routes mounted at `/campaigns`.
///
/// ```text
/// POST /                 -> create_campaign
/// GET  /                 -> list_campaigns
/// GET  /{id}             -> get_campaign
/// PUT  /{id}             -> update_campaign
/// DELETE /{id}           -> delete_campaign
/// PUT  /{id}/messages    -> replace_messages (lock-gated)
/// POST /{id}/lock        -> acquire_lock
/// GET  /{id}/lock        -> get_lock_status
/// POST /{id}/unlock      -> release_lock
/// POST /{id}/send        -> send_campaign
/// GET  /{id}/jobs        -> list_campaign_jobs
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(campaigns::create_campaign).get(campaigns::list_campaigns),
        )
        .route(
            "/{id}",
            get(campaigns::get_campaign)
                .put(campaigns::update_campaign)
                .delete(campaigns::delete_campaign),
        )
        .route("/{id}/messages", put(campaigns::replace_messages))
        .route(
            "/{id}/lock",
            post(campaigns::acquire_lock).get(campaigns::get_lock_status),
        )
        .route("/{id}/unlock", post(campaigns::release_lock))
        .route("/{id}/send", post(campaigns::send_campaign))
        .route("/{id}/jobs", get(campaigns::list_campaign_jobs))
}
