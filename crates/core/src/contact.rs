//! The contact record shared by the ingestor, the combine operation,
//! and the list store.

use serde::{Deserialize, Serialize};

/// A single recipient: a normalized phone number plus an optional name.
///
/// `phone` is always in canonical form (`+91` followed by ten digits,
/// see [`crate::phone::normalize_phone`]). Uniqueness of `phone` is
/// enforced per contact list, not globally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub phone: String,
    pub name: Option<String>,
}

impl Contact {
    pub fn new(phone: impl Into<String>, name: Option<String>) -> Self {
        Self {
            phone: phone.into(),
            name,
        }
    }
}
