//! Note HTTP handlers.
//!
//! All routes are scoped to the caller identified by [`Owner`].

use axum::extract::{Query, State};
use serde::Deserialize;
use utoipa::IntoParams;

use notekeep_core::{
    BulkDeleteOutcome, BulkDeleteRequest, CreateNoteRequest, DetachOutcome, EmptyTrashOutcome,
    Note, NoteViews, UpdateColorRequest, UpdateNoteRequest,
};

use crate::extract::{JsonBody, Owner, PathParams};
use crate::response::{ApiResponse, Created};
use crate::{ApiError, AppState};

type NoteResult = Result<ApiResponse<Note>, ApiError>;
type NotesResult = Result<ApiResponse<Vec<Note>>, ApiError>;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive text matched against title and content.
    #[serde(default)]
    pub query: String,
}

/// `GET /api/notes`: every non-deleted note, pinned first then most recent.
#[utoipa::path(get, path = "/api/notes", tag = "Notes",
    responses((status = 200, description = "Active notes", body = [Note]), (status = 401, description = "Missing caller id")))]
pub async fn list_notes(State(state): State<AppState>, Owner(owner): Owner) -> NotesResult {
    Ok(ApiResponse::ok(state.notes.list_active(owner).await?))
}

/// `GET /api/notes/views`: active notes split the way the board shows them.
#[utoipa::path(get, path = "/api/notes/views", tag = "Notes",
    responses((status = 200, description = "Pinned, other and archived notes", body = NoteViews)))]
pub async fn note_views(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<ApiResponse<NoteViews>, ApiError> {
    Ok(ApiResponse::ok(state.notes.views(owner).await?))
}

#[utoipa::path(get, path = "/api/notes/archived", tag = "Notes",
    responses((status = 200, description = "Archived notes", body = [Note])))]
pub async fn list_archived(State(state): State<AppState>, Owner(owner): Owner) -> NotesResult {
    Ok(ApiResponse::ok(state.notes.list_archived(owner).await?))
}

#[utoipa::path(get, path = "/api/notes/trash", tag = "Notes",
    responses((status = 200, description = "Trashed notes, most recently deleted first", body = [Note])))]
pub async fn list_trash(State(state): State<AppState>, Owner(owner): Owner) -> NotesResult {
    Ok(ApiResponse::ok(state.notes.list_trashed(owner).await?))
}

#[utoipa::path(get, path = "/api/notes/search", tag = "Notes",
    params(SearchQuery),
    responses((status = 200, description = "Matching non-deleted notes", body = [Note])))]
pub async fn search_notes(
    State(state): State<AppState>,
    Owner(owner): Owner,
    Query(params): Query<SearchQuery>,
) -> NotesResult {
    Ok(ApiResponse::ok(
        state.notes.search(owner, &params.query).await?,
    ))
}

#[utoipa::path(post, path = "/api/notes", tag = "Notes",
    request_body = CreateNoteRequest,
    responses((status = 201, description = "Created", body = Note), (status = 400, description = "Invalid note"), (status = 404, description = "Label not found")))]
pub async fn create_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    JsonBody(body): JsonBody<CreateNoteRequest>,
) -> Result<Created<Note>, ApiError> {
    let note = state.notes.create(owner, body).await?;
    Ok(Created(ApiResponse::with_message(
        note,
        "Note created successfully",
    )))
}

#[utoipa::path(get, path = "/api/notes/{id}", tag = "Notes",
    params(("id" = i64, Path, description = "Note id")),
    responses((status = 200, description = "Note", body = Note), (status = 403, description = "Owned by someone else"), (status = 404, description = "Not found")))]
pub async fn get_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams(id): PathParams<i64>,
) -> NoteResult {
    Ok(ApiResponse::ok(state.notes.get(owner, id).await?))
}

#[utoipa::path(put, path = "/api/notes/{id}", tag = "Notes",
    params(("id" = i64, Path, description = "Note id")),
    request_body = UpdateNoteRequest,
    responses((status = 200, description = "Updated", body = Note), (status = 400, description = "Invalid update"), (status = 404, description = "Note or label not found")))]
pub async fn update_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams(id): PathParams<i64>,
    JsonBody(body): JsonBody<UpdateNoteRequest>,
) -> NoteResult {
    let note = state.notes.update(owner, id, body).await?;
    Ok(ApiResponse::with_message(note, "Note updated successfully"))
}

/// `DELETE /api/notes/:id`: move to trash.
#[utoipa::path(delete, path = "/api/notes/{id}", tag = "Notes",
    params(("id" = i64, Path, description = "Note id")),
    responses((status = 200, description = "Moved to trash", body = Note), (status = 404, description = "Not found")))]
pub async fn delete_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams(id): PathParams<i64>,
) -> NoteResult {
    let note = state.notes.trash(owner, id).await?;
    Ok(ApiResponse::with_message(note, "Note moved to trash"))
}

#[utoipa::path(patch, path = "/api/notes/{id}/pin", tag = "Notes",
    params(("id" = i64, Path, description = "Note id")),
    responses((status = 200, description = "Pin toggled", body = Note), (status = 404, description = "Not found")))]
pub async fn toggle_pin(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams(id): PathParams<i64>,
) -> NoteResult {
    let note = state.notes.toggle_pin(owner, id).await?;
    let message = if note.is_pinned {
        "Note pinned"
    } else {
        "Note unpinned"
    };
    Ok(ApiResponse::with_message(note, message))
}

#[utoipa::path(patch, path = "/api/notes/{id}/archive", tag = "Notes",
    params(("id" = i64, Path, description = "Note id")),
    responses((status = 200, description = "Archive toggled", body = Note), (status = 404, description = "Not found")))]
pub async fn toggle_archive(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams(id): PathParams<i64>,
) -> NoteResult {
    let note = state.notes.toggle_archive(owner, id).await?;
    let message = if note.is_archived {
        "Note archived"
    } else {
        "Note unarchived"
    };
    Ok(ApiResponse::with_message(note, message))
}

#[utoipa::path(patch, path = "/api/notes/{id}/trash", tag = "Notes",
    params(("id" = i64, Path, description = "Note id")),
    responses((status = 200, description = "Trash toggled", body = Note), (status = 404, description = "Not found")))]
pub async fn toggle_trash(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams(id): PathParams<i64>,
) -> NoteResult {
    let note = state.notes.toggle_trash(owner, id).await?;
    let message = if note.is_deleted {
        "Note moved to trash"
    } else {
        "Note restored"
    };
    Ok(ApiResponse::with_message(note, message))
}

#[utoipa::path(patch, path = "/api/notes/{id}/color", tag = "Notes",
    params(("id" = i64, Path, description = "Note id")),
    request_body = UpdateColorRequest,
    responses((status = 200, description = "Color updated", body = Note), (status = 400, description = "Malformed color")))]
pub async fn update_color(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams(id): PathParams<i64>,
    JsonBody(body): JsonBody<UpdateColorRequest>,
) -> NoteResult {
    let note = state.notes.update_color(owner, id, &body.color).await?;
    Ok(ApiResponse::with_message(note, "Note color updated"))
}

#[utoipa::path(post, path = "/api/notes/{id}/restore", tag = "Notes",
    params(("id" = i64, Path, description = "Note id")),
    responses((status = 200, description = "Restored", body = Note), (status = 404, description = "Not found")))]
pub async fn restore_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams(id): PathParams<i64>,
) -> NoteResult {
    let note = state.notes.restore(owner, id).await?;
    Ok(ApiResponse::with_message(note, "Note restored"))
}

#[utoipa::path(post, path = "/api/notes/{id}/copy", tag = "Notes",
    params(("id" = i64, Path, description = "Note id")),
    responses((status = 201, description = "Copied", body = Note), (status = 400, description = "Note is in trash")))]
pub async fn copy_note(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams(id): PathParams<i64>,
) -> Result<Created<Note>, ApiError> {
    let note = state.notes.copy(owner, id).await?;
    Ok(Created(ApiResponse::with_message(note, "Note copied")))
}

#[utoipa::path(delete, path = "/api/notes/{id}/permanent", tag = "Notes",
    params(("id" = i64, Path, description = "Note id")),
    responses((status = 200, description = "Deleted for good"), (status = 400, description = "Note is not in trash")))]
pub async fn permanent_delete(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams(id): PathParams<i64>,
) -> Result<ApiResponse<()>, ApiError> {
    state.notes.permanent_delete(owner, id).await?;
    Ok(ApiResponse::message("Note permanently deleted"))
}

#[utoipa::path(delete, path = "/api/notes/trash/empty", tag = "Notes",
    responses((status = 200, description = "Trash emptied", body = EmptyTrashOutcome)))]
pub async fn empty_trash(
    State(state): State<AppState>,
    Owner(owner): Owner,
) -> Result<ApiResponse<EmptyTrashOutcome>, ApiError> {
    let outcome = state.notes.empty_trash(owner).await?;
    Ok(ApiResponse::with_message(outcome, "Trash emptied"))
}

#[utoipa::path(post, path = "/api/notes/bulk-delete", tag = "Notes",
    request_body = BulkDeleteRequest,
    responses((status = 200, description = "Trashed ids and per-id failures", body = BulkDeleteOutcome), (status = 400, description = "No note ids")))]
pub async fn bulk_delete(
    State(state): State<AppState>,
    Owner(owner): Owner,
    JsonBody(body): JsonBody<BulkDeleteRequest>,
) -> Result<ApiResponse<BulkDeleteOutcome>, ApiError> {
    let outcome = state.notes.bulk_delete(owner, &body.note_ids).await?;
    let message = format!(
        "{} note(s) moved to trash, {} failed",
        outcome.deleted.len(),
        outcome.failed.len()
    );
    Ok(ApiResponse::with_message(outcome, message))
}

#[utoipa::path(post, path = "/api/notes/{id}/labels/{label_id}", tag = "Labels",
    params(("id" = i64, Path, description = "Note id"), ("label_id" = i64, Path, description = "Label id")),
    responses((status = 200, description = "Label attached", body = Note), (status = 404, description = "Note or label not found")))]
pub async fn attach_label(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams((id, label_id)): PathParams<(i64, i64)>,
) -> NoteResult {
    let note = state.note_labels.attach(owner, id, label_id).await?;
    Ok(ApiResponse::with_message(note, "Label added to note"))
}

#[utoipa::path(delete, path = "/api/notes/{id}/labels/{label_id}", tag = "Labels",
    params(("id" = i64, Path, description = "Note id"), ("label_id" = i64, Path, description = "Label id")),
    responses((status = 200, description = "Whether the label was attached", body = DetachOutcome), (status = 404, description = "Note not found")))]
pub async fn detach_label(
    State(state): State<AppState>,
    Owner(owner): Owner,
    PathParams((id, label_id)): PathParams<(i64, i64)>,
) -> Result<ApiResponse<DetachOutcome>, ApiError> {
    let outcome = state.note_labels.detach(owner, id, label_id).await?;
    let message = if outcome.detached {
        "Label removed from note"
    } else {
        "Label was not attached to note"
    };
    Ok(ApiResponse::with_message(outcome, message))
}
