//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::response::ApiResponse;

/// Error returned by handlers and extractors.
///
/// Every variant renders as `{ "success": false, "message": ... }`.
#[derive(Debug)]
pub enum ApiError {
    /// Storage or internal failure; details are logged, never returned.
    Internal(notekeep_core::Error),
    /// Missing or malformed caller identity.
    Unauthorized(String),
    /// Entity exists but belongs to someone else.
    Forbidden(String),
    NotFound(String),
    BadRequest(String),
    TooManyRequests,
}

impl From<notekeep_core::Error> for ApiError {
    fn from(err: notekeep_core::Error) -> Self {
        use notekeep_core::Error;
        match &err {
            Error::Validation(_) => ApiError::BadRequest(err.public_message()),
            Error::NotFound(_) | Error::NoteNotFound(_) | Error::LabelNotFound(_) => {
                ApiError::NotFound(err.public_message())
            }
            Error::Unauthorized(_) => ApiError::Forbidden(err.public_message()),
            _ => ApiError::Internal(err),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Internal(err) => {
                tracing::error!(
                    subsystem = "api",
                    error = %err,
                    "Request failed with internal error"
                );
                err.public_message()
            }
            ApiError::TooManyRequests => {
                "Too many requests. Please wait before retrying.".to_string()
            }
            ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::BadRequest(msg) => msg,
        };

        (status, Json(ApiResponse::<()>::failure(message))).into_response()
    }
}
