//! Campaign status lifecycle and message payload type.

use serde::{Deserialize, Serialize};

/// One outbound message within a campaign. Campaigns own their messages;
/// lock scopes refer to them by 0-based index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub body: String,
}

/// Campaign lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Locked,
    Sending,
    Completed,
    Cancelled,
}

impl CampaignStatus {
    /// Return the status name as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Locked => "locked",
            Self::Sending => "sending",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parse a status string. Returns `None` for unknown values.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "locked" => Some(Self::Locked),
            "sending" => Some(Self::Sending),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// All valid status values.
    pub const ALL: &'static [&'static str] =
        &["draft", "locked", "sending", "completed", "cancelled"];

    /// A send may only start from a quiescent, editable campaign.
    pub fn can_start_send(self) -> bool {
        matches!(self, Self::Draft | Self::Locked)
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_round_trip() {
        for name in CampaignStatus::ALL {
            let status = CampaignStatus::from_str(name).unwrap();
            assert_eq!(status.as_str(), *name);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert_eq!(CampaignStatus::from_str("archived"), None);
        assert_eq!(CampaignStatus::from_str("DRAFT"), None);
        assert_eq!(CampaignStatus::from_str(""), None);
    }

    #[test]
    fn test_send_only_from_quiescent_states() {
        assert!(CampaignStatus::Draft.can_start_send());
        assert!(CampaignStatus::Locked.can_start_send());
        assert!(!CampaignStatus::Sending.can_start_send());
        assert!(!CampaignStatus::Completed.can_start_send());
        assert!(!CampaignStatus::Cancelled.can_start_send());
    }
}
