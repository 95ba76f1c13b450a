//! Label HTTP handlers.

use axum::extract::State;

use notekeep_core::{CreateLabelRequest, Label, Note, UpdateLabelRequest};

use crate::extract::{JsonBody, Owner, PathParams};
use crate::response::{ApiResponse, Created};
use crate::{ApiError, AppState};

/// `GET /api/labels`: the caller's labels ordered by name.
#[utoipa::path(get, path = "/api/labels", tag = "Labels",
    responses((status = 200, description = "Labels ordered by name", body = [Label])))]
pub async fn list_labels(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<ApiResponse<Vec<Label>>, ApiError> {
    Ok(ApiResponse::ok(state.labels.list(owner).await?))
}

#[utoipa::path(get, path = "/api/labels/{id}", tag = "Labels",
    params(("id" = i64, Path, description = "Label id")),
    responses((status = 200, description = "Label", body = Label), (status = 404, description = "Not found")))]
pub async fn get_label(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams(id): PathParams<i64>,
) -> Result<ApiResponse<Label>, ApiError> {
    Ok(ApiResponse::ok(state.labels.get(owner, id).await?))
}

#[utoipa::path(post, path = "/api/labels", tag = "Labels",
    request_body = CreateLabelRequest,
    responses((status = 201, description = "Created", body = Label), (status = 400, description = "Invalid or duplicate name")))]
pub async fn create_label(
    State(state): State<AppState>,
    Owner(owner): Owner,
    JsonBody(body): JsonBody<CreateLabelRequest>,
) -> Result<Created<Label>, ApiError> {
    let label = state.labels.create(owner, body).await?;
    Ok(Created(ApiResponse::with_message(
        label,
        "Label created successfully",
    )))
}

#[utoipa::path(put, path = "/api/labels/{id}", tag = "Labels",
    params(("id" = i64, Path, description = "Label id")),
    request_body = UpdateLabelRequest,
    responses((status = 200, description = "Renamed", body = Label), (status = 400, description = "Invalid or duplicate name")))]
pub async fn update_label(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams(id): PathParams<i64>,
    JsonBody(body): JsonBody<UpdateLabelRequest>,
) -> Result<ApiResponse<Label>, ApiError> {
    let label = state.labels.update(owner, id, body).await?;
    Ok(ApiResponse::with_message(label, "Label updated successfully"))
}

#[utoipa::path(delete, path = "/api/labels/{id}", tag = "Labels",
    params(("id" = i64, Path, description = "Label id")),
    responses((status = 200, description = "Deleted along with its associations"), (status = 404, description = "Not found")))]
pub async fn delete_label(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams(id): PathParams<i64>,
) -> Result<ApiResponse<()>, ApiError> {
    state.labels.delete(owner, id).await?;
    Ok(ApiResponse::message("Label deleted successfully"))
}

/// `GET /api/labels/:id/notes`: non-deleted notes carrying the label.
#[utoipa::path(get, path = "/api/labels/{id}/notes", tag = "Labels",
    params(("id" = i64, Path, description = "Label id")),
    responses((status = 200, description = "Non-deleted notes carrying the label", body = [Note]), (status = 403, description = "Owned by someone else")))]
pub async fn label_notes(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams(id): PathParams<i64>,
) -> Result<ApiResponse<Vec<Note>>, ApiError> {
    Ok(ApiResponse::ok(
        state.note_labels.notes_with_label(owner, id).await?,
    ))
}
