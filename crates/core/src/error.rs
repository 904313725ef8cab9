//! Domain error taxonomy shared across the persistence and HTTP layers.

use crate::types::Timestamp;

/// Domain-level errors.
///
/// Each variant maps to exactly one machine-readable error kind at the
/// HTTP boundary. Internal detail (worker response bodies, SQL text) is
/// summarized before it lands in one of these, never carried verbatim.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced list, campaign, or job does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Recoverable bad input (malformed phone, bad scope, bad DTO).
    #[error("{0}")]
    Validation(String),

    /// Malformed input file for the generic parser. Aborts the whole
    /// parse instead of degrading row-by-row.
    #[error("{0}")]
    Structural(String),

    /// The campaign (or an overlapping message scope) is already locked
    /// by a different actor. Carries the holder for display.
    #[error("locked by {holder} since {acquired_at}")]
    LockConflict {
        holder: String,
        acquired_at: Timestamp,
    },

    /// A state or referential conflict (e.g. deleting a list a campaign
    /// still references, releasing someone else's lock).
    #[error("{0}")]
    Conflict(String),

    /// The external send worker is unreachable or timed out.
    #[error("send worker unavailable: {0}")]
    Upstream(String),

    /// An unexpected internal failure. The message is for logs only.
    #[error("{0}")]
    Internal(String),
}
