//! Handlers for the `/lists` resource: upload, inspect, replace,
//! combine, and delete contact lists.
//!
//! Uploads are multipart (`file` part with the raw text, optional
//! `name` field). Row-level parse errors never fail an upload; they are
//! returned inside the report so the caller can show them next to the
//! created list.

use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use validator::Validate;

use sandesh_core::combine::{dedupe_contacts, merge_contacts};
use sandesh_core::contact::Contact;
use sandesh_core::error::CoreError;
use sandesh_core::ingest::{parse_contacts, IngestReport};
use sandesh_core::types::DbId;
use sandesh_db::models::contact_list::{
    CombineListsRequest, ContactList, ContactRow, UpdateListRequest,
};
use sandesh_db::repositories::{CampaignRepo, ContactListRepo};

use crate::error::{AppError, AppResult};
use crate::extract::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

/// Fallback list name when neither a `name` field nor a file name is
/// present in the upload.
const DEFAULT_LIST_NAME: &str = "Uploaded list";

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// Response for uploads: the created/updated list plus the parse report.
#[derive(Debug, Serialize)]
pub struct ListUploadResponse {
    pub list: ContactList,
    /// Contacts actually stored (after in-list dedup).
    pub stored_contacts: usize,
    pub report: IngestReport,
}

/// Response for `GET /lists/{id}`.
#[derive(Debug, Serialize)]
pub struct ListDetailResponse {
    pub list: ContactList,
    pub contacts: Vec<ContactRow>,
}

// ---------------------------------------------------------------------------
// Upload plumbing
// ---------------------------------------------------------------------------

/// A parsed multipart upload: file content plus an optional list name.
struct Upload {
    name: Option<String>,
    content: String,
}

/// Read the `file` part (required) and `name` field (optional) from a
/// multipart body. A file name acts as a fallback list name.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    let mut name: Option<String> = None;
    let mut file_name: Option<String> = None;
    let mut content: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some("name") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Unreadable name field: {e}")))?;
                let value = value.trim().to_string();
                if !value.is_empty() {
                    name = Some(value);
                }
            }
            Some("file") => {
                file_name = field.file_name().map(stem).map(str::to_string);
                content = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Unreadable file content: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let content = content
        .ok_or_else(|| AppError::BadRequest("Missing file part in upload".to_string()))?;

    Ok(Upload {
        name: name.or(file_name),
        content,
    })
}

/// File name without its extension.
fn stem(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(pos) if pos > 0 => &file_name[..pos],
        _ => file_name,
    }
}

/// Run the ingestor over uploaded content, rejecting files with no data
/// rows at all.
fn ingest(content: &str) -> Result<(IngestReport, Vec<Contact>), AppError> {
    let report = parse_contacts(content);
    if report.total_rows == 0 {
        return Err(CoreError::Validation("File contains no data rows".to_string()).into());
    }
    let contacts = dedupe_contacts(&report.contacts);
    Ok((report, contacts))
}

// ---------------------------------------------------------------------------
// Create / upload
// ---------------------------------------------------------------------------

/// POST /api/v1/lists
///
/// Create a contact list from an uploaded file. Returns 201 with the
/// list and the per-row parse report.
pub async fn create_list(
    actor: Actor,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let upload = read_upload(multipart).await?;
    let (report, contacts) = ingest(&upload.content)?;

    let name = upload.name.unwrap_or_else(|| DEFAULT_LIST_NAME.to_string());
    let list = ContactListRepo::create(&state.pool, &name, &contacts, &[]).await?;

    tracing::info!(
        list_id = list.id,
        actor = %actor.0,
        stored = contacts.len(),
        row_errors = report.errors.len(),
        "Contact list created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ListUploadResponse {
                list,
                stored_contacts: contacts.len(),
                report,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Read
// ---------------------------------------------------------------------------

/// GET /api/v1/lists
pub async fn list_lists(
    _actor: Actor,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let lists = ContactListRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: lists }))
}

/// GET /api/v1/lists/{id}
pub async fn get_list(
    _actor: Actor,
    State(state): State<AppState>,
    Path(list_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let list = find_list(&state, list_id).await?;
    let contacts = ContactListRepo::contacts_for(&state.pool, list_id).await?;
    Ok(Json(DataResponse {
        data: ListDetailResponse { list, contacts },
    }))
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// PUT /api/v1/lists/{id}
///
/// JSON body renames the list; a multipart body replaces its contacts
/// (same ingest contract as the initial upload).
pub async fn update_list(
    actor: Actor,
    State(state): State<AppState>,
    Path(list_id): Path<DbId>,
    request: Request,
) -> AppResult<axum::response::Response> {
    find_list(&state, list_id).await?;

    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?;
        let upload = read_upload(multipart).await?;
        let (report, contacts) = ingest(&upload.content)?;

        let list = ContactListRepo::replace_contacts(&state.pool, list_id, &contacts)
            .await?
            .ok_or(missing_list(list_id))?;

        tracing::info!(
            list_id,
            actor = %actor.0,
            stored = contacts.len(),
            "Contact list contents replaced",
        );

        Ok(Json(DataResponse {
            data: ListUploadResponse {
                list,
                stored_contacts: contacts.len(),
                report,
            },
        })
        .into_response())
    } else {
        let Json(input): Json<UpdateListRequest> = Json::from_request(request, &state)
            .await
            .map_err(|e| AppError::BadRequest(format!("Malformed JSON body: {e}")))?;
        input.validate()?;

        let list = ContactListRepo::rename(&state.pool, list_id, &input.name)
            .await?
            .ok_or(missing_list(list_id))?;

        Ok(Json(DataResponse { data: list }).into_response())
    }
}

// ---------------------------------------------------------------------------
// Combine
// ---------------------------------------------------------------------------

/// POST /api/v1/lists/combine
///
/// Union the given lists into a new list, deduplicating on the
/// normalized phone (first-seen wins, names back-fill gaps). The source
/// lists are untouched.
pub async fn combine_lists(
    actor: Actor,
    State(state): State<AppState>,
    Json(input): Json<CombineListsRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let mut sources: Vec<Vec<Contact>> = Vec::with_capacity(input.list_ids.len());
    for &list_id in &input.list_ids {
        find_list(&state, list_id).await?;
        let rows = ContactListRepo::contacts_for(&state.pool, list_id).await?;
        sources.push(rows.iter().map(ContactRow::to_contact).collect());
    }

    let merged = merge_contacts(sources.iter().map(Vec::as_slice));
    let list = ContactListRepo::create(&state.pool, &input.name, &merged, &input.list_ids).await?;

    tracing::info!(
        list_id = list.id,
        actor = %actor.0,
        sources = input.list_ids.len(),
        merged = merged.len(),
        "Contact lists combined",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: list })))
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// DELETE /api/v1/lists/{id}
///
/// Returns 409 while any campaign still references the list.
pub async fn delete_list(
    actor: Actor,
    State(state): State<AppState>,
    Path(list_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let referencing = CampaignRepo::count_referencing_list(&state.pool, list_id).await?;
    if referencing > 0 {
        return Err(CoreError::Conflict(format!(
            "List is referenced by {referencing} campaign(s)"
        ))
        .into());
    }

    let deleted = ContactListRepo::delete(&state.pool, list_id).await?;
    if !deleted {
        return Err(missing_list(list_id).into());
    }

    tracing::info!(list_id, actor = %actor.0, "Contact list deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_list(state: &AppState, list_id: DbId) -> Result<ContactList, AppError> {
    ContactListRepo::find_by_id(&state.pool, list_id)
        .await?
        .ok_or_else(|| missing_list(list_id).into())
}

fn missing_list(list_id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Contact list",
        id: list_id,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_strips_extension() {
        assert_eq!(stem("contacts.csv"), "contacts");
        assert_eq!(stem("my.contacts.txt"), "my.contacts");
        assert_eq!(stem("noext"), "noext");
        assert_eq!(stem(".hidden"), ".hidden");
    }

    #[test]
    fn test_ingest_rejects_empty_file() {
        assert!(ingest("").is_err());
        assert!(ingest("phone,name\n").is_err());
    }

    #[test]
    fn test_ingest_dedupes_within_upload() {
        let (report, contacts) = ingest("9876543210,Alice\n9876543210,").unwrap();
        assert_eq!(report.valid_rows, 2);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].name.as_deref(), Some("Alice"));
    }
}
