//! Campaign lock scopes and their overlap/coverage algebra.
//!
//! A lock covers either the whole campaign or a subset of its message
//! indices. Two locks conflict when their scopes overlap; disjoint
//! message subsets held by different actors coexist. The persistence
//! layer serializes scopes as tagged JSON.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// TTL constants
// ---------------------------------------------------------------------------

/// Default lock time-to-live in minutes. An abandoned lock self-heals
/// after this long (expiry is enforced lazily at access time).
pub const DEFAULT_LOCK_TTL_MINS: i64 = 30;

/// Minimum configurable lock TTL in minutes.
pub const MIN_LOCK_TTL_MINS: i64 = 1;

/// Maximum configurable lock TTL in minutes (4 hours).
pub const MAX_LOCK_TTL_MINS: i64 = 240;

/// Validate a configured lock TTL. Returns `Ok(())` or an error message.
pub fn validate_lock_ttl(minutes: i64) -> Result<(), String> {
    if minutes < MIN_LOCK_TTL_MINS {
        return Err(format!(
            "Lock TTL must be at least {MIN_LOCK_TTL_MINS} minute(s), got {minutes}"
        ));
    }
    if minutes > MAX_LOCK_TTL_MINS {
        return Err(format!(
            "Lock TTL must be at most {MAX_LOCK_TTL_MINS} minutes, got {minutes}"
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// What a campaign lock protects.
///
/// Serialized as JSON with an internally-tagged `"type"` discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LockScope {
    /// The entire campaign, every message included.
    WholeCampaign,
    /// A specific set of message indices (0-based).
    Messages { indices: BTreeSet<usize> },
}

impl LockScope {
    /// Convenience constructor for a message-subset scope.
    pub fn messages<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        Self::Messages {
            indices: indices.into_iter().collect(),
        }
    }
}

/// Returns `true` when two scopes contend for the same messages.
pub fn scopes_overlap(a: &LockScope, b: &LockScope) -> bool {
    match (a, b) {
        (LockScope::WholeCampaign, _) | (_, LockScope::WholeCampaign) => true,
        (LockScope::Messages { indices: left }, LockScope::Messages { indices: right }) => {
            !left.is_disjoint(right)
        }
    }
}

/// Returns `true` when a held scope is sufficient for an operation that
/// needs `required`.
pub fn scope_covers(held: &LockScope, required: &LockScope) -> bool {
    match (held, required) {
        (LockScope::WholeCampaign, _) => true,
        (LockScope::Messages { .. }, LockScope::WholeCampaign) => false,
        (LockScope::Messages { indices: held }, LockScope::Messages { indices: required }) => {
            required.is_subset(held)
        }
    }
}

/// Validate a scope against a campaign's message count.
pub fn validate_scope(scope: &LockScope, message_count: usize) -> Result<(), String> {
    match scope {
        LockScope::WholeCampaign => Ok(()),
        LockScope::Messages { indices } => {
            if indices.is_empty() {
                return Err("Message scope must name at least one index".to_string());
            }
            if let Some(&out_of_range) = indices.iter().find(|&&i| i >= message_count) {
                return Err(format!(
                    "Message index {out_of_range} is out of range (campaign has {message_count} message(s))"
                ));
            }
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Overlap
    // -----------------------------------------------------------------------

    #[test]
    fn test_whole_overlaps_everything() {
        let whole = LockScope::WholeCampaign;
        assert!(scopes_overlap(&whole, &whole));
        assert!(scopes_overlap(&whole, &LockScope::messages([3])));
        assert!(scopes_overlap(&LockScope::messages([3]), &whole));
    }

    #[test]
    fn test_disjoint_subsets_do_not_overlap() {
        let a = LockScope::messages([0, 1]);
        let b = LockScope::messages([2, 3]);
        assert!(!scopes_overlap(&a, &b));
    }

    #[test]
    fn test_shared_index_overlaps() {
        let a = LockScope::messages([0, 1]);
        let b = LockScope::messages([1, 2]);
        assert!(scopes_overlap(&a, &b));
    }

    // -----------------------------------------------------------------------
    // Coverage
    // -----------------------------------------------------------------------

    #[test]
    fn test_whole_covers_subsets() {
        assert!(scope_covers(
            &LockScope::WholeCampaign,
            &LockScope::messages([5])
        ));
        assert!(scope_covers(
            &LockScope::WholeCampaign,
            &LockScope::WholeCampaign
        ));
    }

    #[test]
    fn test_subset_never_covers_whole() {
        assert!(!scope_covers(
            &LockScope::messages([0, 1, 2]),
            &LockScope::WholeCampaign
        ));
    }

    #[test]
    fn test_subset_coverage_is_inclusion() {
        let held = LockScope::messages([0, 1, 2]);
        assert!(scope_covers(&held, &LockScope::messages([1, 2])));
        assert!(!scope_covers(&held, &LockScope::messages([2, 3])));
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn test_whole_scope_always_valid() {
        assert!(validate_scope(&LockScope::WholeCampaign, 0).is_ok());
    }

    #[test]
    fn test_empty_subset_invalid() {
        let result = validate_scope(&LockScope::messages([]), 5);
        assert!(result.unwrap_err().contains("at least one"));
    }

    #[test]
    fn test_out_of_range_index_invalid() {
        let result = validate_scope(&LockScope::messages([4]), 4);
        assert!(result.unwrap_err().contains("out of range"));
    }

    #[test]
    fn test_in_range_subset_valid() {
        assert!(validate_scope(&LockScope::messages([0, 3]), 4).is_ok());
    }

    #[test]
    fn test_ttl_bounds() {
        assert!(validate_lock_ttl(DEFAULT_LOCK_TTL_MINS).is_ok());
        assert!(validate_lock_ttl(0).is_err());
        assert!(validate_lock_ttl(241).is_err());
    }

    // -----------------------------------------------------------------------
    // Serialization
    // -----------------------------------------------------------------------

    #[test]
    fn test_scope_serialization_round_trip() {
        for scope in [LockScope::WholeCampaign, LockScope::messages([0, 2, 7])] {
            let json = serde_json::to_string(&scope).unwrap();
            let back: LockScope = serde_json::from_str(&json).unwrap();
            assert_eq!(scope, back);
        }
    }

    #[test]
    fn test_scope_json_shape() {
        let json = serde_json::to_string(&LockScope::WholeCampaign).unwrap();
        assert!(json.contains(r#""type":"whole_campaign"#));

        let json = serde_json::to_string(&LockScope::messages([1])).unwrap();
        assert!(json.contains(r#""type":"messages"#));
        assert!(json.contains(r#""indices":[1]"#));
    }
}
