//! Note lifecycle service.
//!
//! Every mutation follows the same order: fetch the note, check the caller
//! owns it, validate the input, then apply and persist. Nothing is written
//! when any step fails.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use notekeep_core::defaults::COPY_TITLE_SUFFIX;
use notekeep_core::validation::{
    color_or_default, dedup_ids, validate_color, validate_id, validate_owner,
};
use notekeep_core::{
    BulkDeleteOutcome, BulkFailure, CreateNoteRequest, EmptyTrashOutcome, Error, LabelRepository,
    NewNote, Note, NoteFilter, NoteRepository, NoteViews, Owned, Result, UpdateNoteRequest,
};

/// Note lifecycle operations: create, edit, pin, archive, trash, restore, delete.
#[derive(Clone)]
pub struct NoteService {
    notes: Arc<dyn NoteRepository>,
    labels: Arc<dyn LabelRepository>,
}

impl NoteService {
    pub fn new(notes: Arc<dyn NoteRepository>, labels: Arc<dyn LabelRepository>) -> Self {
        Self { notes, labels }
    }

    /// Load a note the caller owns.
    async fn load_owned(&self, owner_id: i64, note_id: i64) -> Result<Note> {
        validate_owner(owner_id)?;
        validate_id(note_id, "note")?;
        let note = self
            .notes
            .fetch(note_id)
            .await?
            .ok_or(Error::NoteNotFound(note_id))?;
        note.ensure_owned_by(owner_id)?;
        Ok(note)
    }

    /// Resolve label ids under the owner. Unknown or foreign ids are `LabelNotFound`.
    async fn resolve_labels(&self, owner_id: i64, label_ids: &[i64]) -> Result<Vec<i64>> {
        let ids = dedup_ids(label_ids);
        for id in &ids {
            validate_id(*id, "label")?;
        }
        if ids.is_empty() {
            return Ok(ids);
        }
        let found = self.labels.fetch_for_owner(owner_id, &ids).await?;
        if let Some(missing) = ids.iter().find(|id| !found.iter().any(|l| l.id == **id)) {
            return Err(Error::LabelNotFound(*missing));
        }
        Ok(ids)
    }

    async fn trash_owned(&self, mut note: Note, owner_id: i64, at: DateTime<Utc>) -> Result<()> {
        note.ensure_owned_by(owner_id)?;
        if note.trash(at) {
            self.notes.save(&note).await?;
        }
        Ok(())
    }

    async fn persist(&self, note: Note, op: &'static str) -> Result<Note> {
        self.notes.save(&note).await?;
        info!(
            subsystem = "notes",
            component = "lifecycle",
            op,
            note_id = note.id,
            owner_id = note.owner_id,
            "Note updated"
        );
        Ok(note)
    }

    pub async fn get(&self, owner_id: i64, note_id: i64) -> Result<Note> {
        self.load_owned(owner_id, note_id).await
    }

    /// Every non-deleted note, pinned first then most recent.
    pub async fn list_active(&self, owner_id: i64) -> Result<Vec<Note>> {
        validate_owner(owner_id)?;
        let notes = self.notes.list(owner_id, NoteFilter::Active).await?;
        debug!(
            subsystem = "notes",
            op = "list_active",
            owner_id,
            result_count = notes.len(),
            "Listed notes"
        );
        Ok(notes)
    }

    /// Active notes split into pinned, others and archived.
    pub async fn views(&self, owner_id: i64) -> Result<NoteViews> {
        Ok(NoteViews::partition(self.list_active(owner_id).await?))
    }

    pub async fn list_archived(&self, owner_id: i64) -> Result<Vec<Note>> {
        validate_owner(owner_id)?;
        self.notes.list(owner_id, NoteFilter::Archived).await
    }

    /// The trash, most recently deleted first.
    pub async fn list_trashed(&self, owner_id: i64) -> Result<Vec<Note>> {
        validate_owner(owner_id)?;
        self.notes.list(owner_id, NoteFilter::Trashed).await
    }

    /// Case-insensitive substring search over title and content.
    ///
    /// A blank query matches nothing.
    pub async fn search(&self, owner_id: i64, query: &str) -> Result<Vec<Note>> {
        validate_owner(owner_id)?;
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let notes = self.notes.search(owner_id, query).await?;
        debug!(
            subsystem = "notes",
            op = "search",
            owner_id,
            query,
            result_count = notes.len(),
            "Searched notes"
        );
        Ok(notes)
    }

    /// Create a note. An absent or malformed color falls back to the default.
    pub async fn create(&self, owner_id: i64, req: CreateNoteRequest) -> Result<Note> {
        validate_owner(owner_id)?;
        let label_ids = self
            .resolve_labels(owner_id, req.label_ids.as_deref().unwrap_or_default())
            .await?;

        let note = self
            .notes
            .insert(NewNote {
                owner_id,
                title: req.title,
                content: req.content,
                color: color_or_default(req.color.as_deref()),
                label_ids,
                created_at: Utc::now(),
            })
            .await?;

        info!(
            subsystem = "notes",
            component = "lifecycle",
            op = "create",
            note_id = note.id,
            owner_id,
            label_count = note.labels.len(),
            "Note created"
        );
        Ok(note)
    }

    /// Partial update: only the provided fields change.
    ///
    /// `label_ids` replaces the whole label set; `is_deleted` trashes or
    /// restores the note, keeping `deleted_at` consistent.
    pub async fn update(&self, owner_id: i64, note_id: i64, req: UpdateNoteRequest) -> Result<Note> {
        let mut note = self.load_owned(owner_id, note_id).await?;

        let color = req.color.as_deref().map(validate_color).transpose()?;
        let label_ids = match &req.label_ids {
            Some(ids) => Some(self.resolve_labels(owner_id, ids).await?),
            None => None,
        };

        let now = Utc::now();
        if let Some(title) = req.title {
            note.title = Some(title);
        }
        if let Some(content) = req.content {
            note.content = Some(content);
        }
        if let Some(color) = color {
            note.color = color;
        }
        if let Some(pinned) = req.is_pinned {
            note.is_pinned = pinned;
        }
        if let Some(archived) = req.is_archived {
            note.is_archived = archived;
        }
        match req.is_deleted {
            Some(true) => {
                note.trash(now);
            }
            Some(false) => {
                note.restore(now);
            }
            None => {}
        }
        note.touch(now);

        let Some(ids) = label_ids else {
            return self.persist(note, "update").await;
        };
        // A label deleted since `resolve_labels` fails the whole write.
        self.notes.save_with_labels(&note, &ids, now).await?;
        info!(
            subsystem = "notes",
            component = "lifecycle",
            op = "update",
            note_id = note.id,
            owner_id = note.owner_id,
            label_count = ids.len(),
            "Note updated"
        );
        self.notes
            .fetch(note.id)
            .await?
            .ok_or(Error::NoteNotFound(note.id))
    }

    pub async fn toggle_pin(&self, owner_id: i64, note_id: i64) -> Result<Note> {
        let mut note = self.load_owned(owner_id, note_id).await?;
        note.toggle_pin(Utc::now());
        self.persist(note, "toggle_pin").await
    }

    pub async fn toggle_archive(&self, owner_id: i64, note_id: i64) -> Result<Note> {
        let mut note = self.load_owned(owner_id, note_id).await?;
        note.toggle_archive(Utc::now());
        self.persist(note, "toggle_archive").await
    }

    /// Trash an active note, restore a trashed one.
    pub async fn toggle_trash(&self, owner_id: i64, note_id: i64) -> Result<Note> {
        let mut note = self.load_owned(owner_id, note_id).await?;
        let now = Utc::now();
        if note.is_deleted {
            note.restore(now);
        } else {
            note.trash(now);
        }
        self.persist(note, "toggle_trash").await
    }

    pub async fn update_color(&self, owner_id: i64, note_id: i64, color: &str) -> Result<Note> {
        let mut note = self.load_owned(owner_id, note_id).await?;
        let color = validate_color(color)?;
        note.set_color(color, Utc::now());
        self.persist(note, "update_color").await
    }

    /// Move to trash. Trashing a trashed note succeeds without writing.
    pub async fn trash(&self, owner_id: i64, note_id: i64) -> Result<Note> {
        let mut note = self.load_owned(owner_id, note_id).await?;
        if !note.trash(Utc::now()) {
            return Ok(note);
        }
        self.persist(note, "trash").await
    }

    /// Take out of trash. Restoring an active note succeeds without writing.
    pub async fn restore(&self, owner_id: i64, note_id: i64) -> Result<Note> {
        let mut note = self.load_owned(owner_id, note_id).await?;
        if !note.restore(Utc::now()) {
            return Ok(note);
        }
        self.persist(note, "restore").await
    }

    /// Delete a trashed note for good, associations included.
    pub async fn permanent_delete(&self, owner_id: i64, note_id: i64) -> Result<()> {
        let note = self.load_owned(owner_id, note_id).await?;
        if !note.is_deleted {
            return Err(Error::Validation(
                "Note must be in trash before it can be permanently deleted".to_string(),
            ));
        }
        if !self.notes.delete(note.id).await? {
            return Err(Error::NoteNotFound(note.id));
        }
        info!(
            subsystem = "notes",
            component = "lifecycle",
            op = "permanent_delete",
            note_id,
            owner_id,
            "Note permanently deleted"
        );
        Ok(())
    }

    /// Permanently delete every trashed note of the owner in one statement.
    pub async fn empty_trash(&self, owner_id: i64) -> Result<EmptyTrashOutcome> {
        validate_owner(owner_id)?;
        let deleted_count = self.notes.delete_trashed(owner_id).await?;
        info!(
            subsystem = "notes",
            component = "lifecycle",
            op = "empty_trash",
            owner_id,
            result_count = deleted_count,
            "Trash emptied"
        );
        Ok(EmptyTrashOutcome { deleted_count })
    }

    /// Trash several notes. Ids that cannot be trashed are skipped and reported.
    pub async fn bulk_delete(&self, owner_id: i64, note_ids: &[i64]) -> Result<BulkDeleteOutcome> {
        validate_owner(owner_id)?;
        if note_ids.is_empty() {
            return Err(Error::Validation("No note IDs provided".to_string()));
        }

        let ids = dedup_ids(note_ids);
        let valid: Vec<i64> = ids.iter().copied().filter(|id| *id > 0).collect();
        let mut found: HashMap<i64, Note> = self
            .notes
            .fetch_many(&valid)
            .await?
            .into_iter()
            .map(|n| (n.id, n))
            .collect();

        let now = Utc::now();
        let mut outcome = BulkDeleteOutcome::default();
        for id in ids {
            let attempt = if id <= 0 {
                validate_id(id, "note")
            } else {
                match found.remove(&id) {
                    None => Err(Error::NoteNotFound(id)),
                    Some(note) => self.trash_owned(note, owner_id, now).await,
                }
            };
            match attempt {
                Ok(()) => outcome.deleted.push(id),
                Err(e) => {
                    if !matches!(
                        e,
                        Error::Validation(_) | Error::Unauthorized(_) | Error::NoteNotFound(_)
                    ) {
                        warn!(
                            subsystem = "notes",
                            op = "bulk_delete",
                            note_id = id,
                            error = %e,
                            "Bulk delete skipped note"
                        );
                    }
                    outcome.failed.push(BulkFailure {
                        id,
                        reason: e.public_message(),
                    });
                }
            }
        }

        info!(
            subsystem = "notes",
            component = "lifecycle",
            op = "bulk_delete",
            owner_id,
            result_count = outcome.deleted.len(),
            failed_count = outcome.failed.len(),
            "Bulk delete finished"
        );
        Ok(outcome)
    }

    /// Duplicate a note with its labels; the title gets a " (copy)" suffix.
    pub async fn copy(&self, owner_id: i64, note_id: i64) -> Result<Note> {
        let source = self.load_owned(owner_id, note_id).await?;
        if source.is_deleted {
            return Err(Error::Validation(
                "Notes in trash cannot be copied".to_string(),
            ));
        }

        let copy = self
            .notes
            .insert(NewNote {
                owner_id,
                title: source
                    .title
                    .as_ref()
                    .map(|t| format!("{}{}", t, COPY_TITLE_SUFFIX)),
                content: source.content.clone(),
                color: source.color.clone(),
                label_ids: source.label_ids(),
                created_at: Utc::now(),
            })
            .await?;

        info!(
            subsystem = "notes",
            component = "lifecycle",
            op = "copy",
            note_id = copy.id,
            source_id = source.id,
            owner_id,
            "Note copied"
        );
        Ok(copy)
    }
}
