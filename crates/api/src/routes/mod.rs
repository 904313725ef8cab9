pub mod campaigns;
pub mod health;
pub mod jobs;
pub mod lists;
pub mod tables;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /lists                      upload (POST), list (GET)
/// /lists/combine              deduplicating union (POST)
/// /lists/{id}                 get, rename or replace contacts (PUT), delete
///
/// /campaigns                  create, list
/// /campaigns/{id}             get, update metadata (PUT), delete
/// /campaigns/{id}/messages    replace messages (PUT, lock-gated)
/// /campaigns/{id}/lock        acquire (POST), current holders (GET)
/// /campaigns/{id}/unlock      release (POST)
/// /campaigns/{id}/send        start a dispatch job (POST)
/// /campaigns/{id}/jobs        send attempts (GET)
///
/// /jobs/health                send-worker liveness (GET)
/// /jobs/{id}                  status relay, optional long poll (GET)
/// /jobs/{id}/cancel           idempotent cancel request (POST)
///
/// /tables/parse               universal row parser (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/lists", lists::router())
        .nest("/campaigns", campaigns::router())
        .nest("/jobs", jobs::router())
        .nest("/tables", tables::router())
}
