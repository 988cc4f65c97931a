use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Access token required")]
    Unauthenticated,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Admin role required")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Duplicate(&'static str),
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    /// Logs the underlying cause and surfaces a generic 500 to the caller.
    pub fn internal<E: std::fmt::Display>(err: E) -> Self {
        error!(error = %err, "internal error");
        ApiError::Internal
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthenticated | ApiError::InvalidToken | ApiError::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Duplicate(_) => StatusCode::CONFLICT,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "message": self.to_string() }))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Record"),
            StoreError::Duplicate => ApiError::Duplicate("Record already exists"),
            StoreError::Unavailable(_) => ApiError::internal(err),
        }
    }
}
