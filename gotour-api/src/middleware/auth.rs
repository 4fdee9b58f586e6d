use axum::{extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;

// ============================================================================
// Bearer token pass-through
// ============================================================================

/// Token from `Authorization: Bearer ...`, if the client sent one. Tokens
/// are issued and verified by the GoTour auth service; they are only
/// forwarded from here.
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    pub fn from_header(value: Option<&str>) -> Self {
        let token = value
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        Self(token)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        Ok(Self::from_header(header))
    }
}
