//! Contact list and contact models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

use sandesh_core::types::{DbId, Timestamp};

/// A row from the `contact_lists` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContactList {
    pub id: DbId,
    pub name: String,
    /// IDs of the lists this one was combined from; empty when the list
    /// was created directly from an upload.
    pub source_list_ids: Json<Vec<DbId>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `contacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContactRow {
    pub id: DbId,
    pub list_id: DbId,
    pub position: i32,
    pub phone: String,
    pub name: Option<String>,
}

impl ContactRow {
    /// Project the row down to the domain contact type.
    pub fn to_contact(&self) -> sandesh_core::contact::Contact {
        sandesh_core::contact::Contact {
            phone: self.phone.clone(),
            name: self.name.clone(),
        }
    }
}

/// DTO for renaming a list via `PUT /lists/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateListRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
}

/// DTO for `POST /lists/combine`.
#[derive(Debug, Deserialize, Validate)]
pub struct CombineListsRequest {
    #[validate(length(min = 1))]
    pub list_ids: Vec<DbId>,
    #[validate(length(min = 1, max = 120))]
    pub name: String,
}
