//! Campaign models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

use sandesh_core::campaign::{CampaignStatus, Message};
use sandesh_core::error::CoreError;
use sandesh_core::types::{DbId, Timestamp};

/// A row from the `campaigns` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub name: String,
    /// Non-owning reference into `contact_lists`.
    pub list_id: DbId,
    /// Ordered message array; lock scopes index into it.
    pub messages: Json<Vec<Message>>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Campaign {
    /// Parse the stored status string into the typed enum.
    pub fn parsed_status(&self) -> Result<CampaignStatus, CoreError> {
        CampaignStatus::from_str(&self.status).ok_or_else(|| {
            CoreError::Internal(format!(
                "campaign {} has unknown status '{}'",
                self.id, self.status
            ))
        })
    }
}

/// DTO for creating a campaign.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCampaignRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub list_id: DbId,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// DTO for updating campaign metadata (name and/or list reference).
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCampaignRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub list_id: Option<DbId>,
}

/// DTO for replacing a campaign's message array.
#[derive(Debug, Deserialize)]
pub struct ReplaceMessagesRequest {
    pub messages: Vec<Message>,
}
