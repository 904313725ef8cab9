//! Request extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;

/// Header carrying the caller's actor identifier.
///
/// Authentication happens upstream; by the time a request reaches this
/// service the proxy has verified the caller and stamped this header.
/// The value is opaque here and is used as the lock holder identity.
pub const ACTOR_HEADER: &str = "x-actor";

/// The calling actor, extracted from the `x-actor` header.
#[derive(Debug, Clone)]
pub struct Actor(pub String);

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Actor(value.to_string()))
            .ok_or_else(|| {
                AppError::Unauthorized(format!("Missing or empty {ACTOR_HEADER} header"))
            })
    }
}
