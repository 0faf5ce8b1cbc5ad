//! Mapping of service failures onto HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::board::{
    domain::BoardDomainError, ports::BoardStoreError, services::BoardServiceError,
};

/// Result type for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors rendered as `{"detail": ...}` JSON bodies.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A board service refused or failed the request.
    #[error(transparent)]
    Service(#[from] BoardServiceError),

    /// The agent push key was missing or wrong.
    #[error("invalid or missing API key")]
    Unauthorized,
}

impl From<BoardDomainError> for ApiError {
    fn from(err: BoardDomainError) -> Self {
        Self::Service(err.into())
    }
}

impl ApiError {
    /// Returns the status code the error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Service(err) => match err {
                BoardServiceError::TaskNotFound(_) | BoardServiceError::ActionItemNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                BoardServiceError::PermissionDenied { .. } => StatusCode::FORBIDDEN,
                BoardServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                BoardServiceError::Store(BoardStoreError::Conflict(_)) => StatusCode::CONFLICT,
                BoardServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
            "internal server error".to_owned()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
