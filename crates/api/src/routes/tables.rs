//! Route definitions for the universal row parser.

use axum::routing::post;
use axum::Router;

use crate::handlers::tables;
use crate::state::AppState;

/// Table routes mounted at `/tables`.
///
/// ```text
/// POST /parse -> parse_table_text (raw CSV body in, keyed rows out)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/parse", post(tables::parse_table_text))
}
