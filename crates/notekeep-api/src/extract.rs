//! Request extractors.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use crate::middleware::record_owner;
use crate::{ApiError, AppState};

/// Caller identity forwarded by the upstream gateway.
///
/// Read from the configured header (`x-user-id` by default); a missing,
/// non-numeric or non-positive value is rejected with 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub i64);

#[axum::async_trait]
impl FromRequestParts<AppState> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let owner_id = parts
            .headers
            .get(&state.user_id_header)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|id| *id > 0);

        match owner_id {
            Some(id) => {
                record_owner(id);
                Ok(Owner(id))
            }
            None => {
                tracing::debug!(
                    subsystem = "api",
                    component = "identity",
                    header = %state.user_id_header,
                    "Rejected request without a valid user id"
                );
                Err(ApiError::Unauthorized(
                    "Missing or invalid user identity".to_string(),
                ))
            }
        }
    }
}

/// `axum::Json` with the rejection rendered in the error envelope.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| ApiError::BadRequest(e.body_text()))?;
        Ok(JsonBody(value))
    }
}

/// `axum::extract::Path` with the rejection rendered in the error envelope.
#[derive(Debug)]
pub struct PathParams<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: PathRejection| ApiError::BadRequest(e.body_text()))?;
        Ok(PathParams(value))
    }
}
