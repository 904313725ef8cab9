//! Handler for the universal row parser: turn arbitrary-column CSV
//! into header-keyed rows for non-phone data (segment attributes,
//! coupon tables, anything tabular).

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use sandesh_core::error::CoreError;
use sandesh_core::tabular::{parse_table, rows_to_csv, Table};

use crate::error::AppResult;
use crate::extract::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

/// Parsed table plus its canonical (fully quoted) CSV rendering.
#[derive(Debug, Serialize)]
pub struct TableResponse {
    #[serde(flatten)]
    pub table: Table,
    /// Round-trippable CSV: every field quoted, original header order.
    pub canonical_csv: String,
}

/// POST /api/v1/tables/parse
///
/// Body is the raw delimited text. The first non-empty line is always
/// the header; a file without usable headers is rejected as a whole
/// (422), unlike the row-tolerant phone ingestor.
pub async fn parse_table_text(
    _actor: Actor,
    State(_state): State<AppState>,
    body: String,
) -> AppResult<impl IntoResponse> {
    let table = parse_table(&body).map_err(|e| CoreError::Structural(e.to_string()))?;
    let canonical_csv = rows_to_csv(&table.headers, &table.rows);

    Ok(Json(DataResponse {
        data: TableResponse {
            table,
            canonical_csv,
        },
    }))
}
