//! API key check for agent push endpoints.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use super::ApiError;

/// Header carrying the key when bearer auth is not used.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Expected key, or `None` when the check is disabled.
#[derive(Debug, Clone, Default)]
pub struct ApiKey(Option<Arc<str>>);

impl ApiKey {
    /// Wraps the configured key. Blank keys disable the check.
    #[must_use]
    pub fn new(key: Option<&str>) -> Self {
        Self(
            key.map(str::trim)
                .filter(|value| !value.is_empty())
                .map(Arc::from),
        )
    }

    /// Reports whether `presented` matches, in time independent of where
    /// the inputs differ.
    #[must_use]
    pub fn accepts(&self, presented: Option<&str>) -> bool {
        let Some(expected) = self.0.as_deref() else {
            return true;
        };
        let Some(candidate) = presented else {
            return false;
        };
        let expected_digest = Sha256::digest(expected.as_bytes());
        let candidate_digest = Sha256::digest(candidate.as_bytes());
        expected_digest
            .iter()
            .zip(candidate_digest.iter())
            .fold(0_u8, |acc, (left, right)| acc | (left ^ right))
            == 0
    }
}

/// Extracts a key from `Authorization: Bearer` or `X-API-Key`.
fn presented_key(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);
    bearer.or_else(|| {
        headers
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
    })
}

/// Middleware rejecting requests without the configured key.
///
/// # Errors
///
/// Returns [`ApiError::Unauthorized`] when the key does not match.
pub async fn require_api_key(
    State(key): State<ApiKey>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if key.accepts(presented_key(request.headers())) {
        Ok(next.run(request).await)
    } else {
        Err(ApiError::Unauthorized)
    }
}
