//! OpenAPI document served at `/openapi.json`.

use utoipa::OpenApi;

use crate::handlers::{labels, notes, system};
use notekeep_core::{
    BulkDeleteOutcome, BulkDeleteRequest, BulkFailure, CreateLabelRequest, CreateNoteRequest,
    DetachOutcome, EmptyTrashOutcome, Label, LabelSummary, Note, NoteViews, UpdateColorRequest,
    UpdateLabelRequest, UpdateNoteRequest,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Notekeep API",
        description = "Notes with pinning, archiving, trash, colors and per-user labels. \
            Every /api route requires the caller id in the X-User-Id header \
            (configurable with USER_ID_HEADER)."
    ),
    paths(
        system::health_check,
        system::openapi_json,
        notes::list_notes,
        notes::note_views,
        notes::list_archived,
        notes::list_trash,
        notes::search_notes,
        notes::create_note,
        notes::get_note,
        notes::update_note,
        notes::delete_note,
        notes::toggle_pin,
        notes::toggle_archive,
        notes::toggle_trash,
        notes::update_color,
        notes::restore_note,
        notes::copy_note,
        notes::permanent_delete,
        notes::empty_trash,
        notes::bulk_delete,
        notes::attach_label,
        notes::detach_label,
        labels::list_labels,
        labels::get_label,
        labels::create_label,
        labels::update_label,
        labels::delete_label,
        labels::label_notes,
    ),
    components(schemas(
        Note,
        LabelSummary,
        Label,
        NoteViews,
        CreateNoteRequest,
        UpdateNoteRequest,
        UpdateColorRequest,
        BulkDeleteRequest,
        BulkDeleteOutcome,
        BulkFailure,
        EmptyTrashOutcome,
        DetachOutcome,
        CreateLabelRequest,
        UpdateLabelRequest,
    )),
    tags(
        (name = "Notes", description = "Note lifecycle: create, edit, pin, archive, trash"),
        (name = "Labels", description = "Label management and note-label associations"),
        (name = "System", description = "Health checks and API description")
    )
)]
pub struct ApiDoc;
