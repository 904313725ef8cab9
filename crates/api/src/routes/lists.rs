//! Route definitions for contact lists.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::lists;
use crate::state::AppState;

/// Contact list routes mounted at `/lists`.
///
/// ```text
/// POST   /             -> create_list (multipart upload)
/// GET    /             -> list_lists
/// POST   /combine      -> combine_lists
/// GET    /{id}         -> get_list
/// PUT    /{id}         -> update_list (JSON rename or multipart replace)
/// DELETE /{id}         -> delete_list
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(lists::create_list).get(lists::list_lists))
        .route("/combine", post(lists::combine_lists))
        .route(
            "/{id}",
            get(lists::get_list)
                .put(lists::update_list)
                .delete(lists::delete_list),
        )
}
