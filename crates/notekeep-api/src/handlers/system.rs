//! Health check and API description.

use axum::response::IntoResponse;
use axum::Json;
use utoipa::OpenApi;

use crate::openapi::ApiDoc;

#[utoipa::path(get, path = "/health", tag = "System",
    responses((status = 200, description = "Service is healthy")))]
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[utoipa::path(get, path = "/openapi.json", tag = "System",
    responses((status = 200, description = "This document")))]
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
