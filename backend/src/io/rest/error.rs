use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::ErrorResponse;
use thiserror::Error;
use tracing::{error, warn};

use crate::domain::LedgerError;

/// Error returned by every handler, rendered as `{"error": "..."}`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    /// Request could not be decoded (body, query string or path)
    #[error("{0}")]
    BadRequest(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Ledger(LedgerError::NotFound(message)) => (StatusCode::NOT_FOUND, message),
            ApiError::Ledger(LedgerError::Validation(message)) | ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, message)
            }
            ApiError::Ledger(LedgerError::Internal(e)) => {
                error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        if status != StatusCode::INTERNAL_SERVER_ERROR {
            warn!("Request rejected with {}: {}", status, message);
        }
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
