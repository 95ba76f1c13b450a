//! Note-label association service.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use notekeep_core::validation::{validate_id, validate_owner};
use notekeep_core::{
    DetachOutcome, Error, Label, LabelRepository, Note, NoteRepository, Owned, Result,
};

/// Attaches and detaches labels on notes the caller owns.
#[derive(Clone)]
pub struct NoteLabelService {
    notes: Arc<dyn NoteRepository>,
    labels: Arc<dyn LabelRepository>,
}

impl NoteLabelService {
    pub fn new(notes: Arc<dyn NoteRepository>, labels: Arc<dyn LabelRepository>) -> Self {
        Self { notes, labels }
    }

    async fn owned_note(&self, owner_id: i64, note_id: i64) -> Result<Note> {
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

    /// Label lookup scoped to the owner: a foreign label is simply not found.
    async fn scoped_label(&self, owner_id: i64, label_id: i64) -> Result<Label> {
        validate_id(label_id, "label")?;
        self.labels
            .fetch_for_owner(owner_id, &[label_id])
            .await?
            .into_iter()
            .next()
            .ok_or(Error::LabelNotFound(label_id))
    }

    /// Attach a label. Attaching an already attached label returns the note unchanged.
    pub async fn attach(&self, owner_id: i64, note_id: i64, label_id: i64) -> Result<Note> {
        let note = self.owned_note(owner_id, note_id).await?;
        self.scoped_label(owner_id, label_id).await?;

        if note.has_label(label_id) {
            return Ok(note);
        }
        if self.notes.attach_label(note_id, label_id, Utc::now()).await? {
            info!(
                subsystem = "labels",
                component = "associations",
                op = "attach",
                note_id,
                label_id,
                owner_id,
                "Label attached"
            );
        }

        self.notes
            .fetch(note_id)
            .await?
            .ok_or(Error::NoteNotFound(note_id))
    }

    /// Detach a label. Reports `detached: false` when it was not attached,
    /// including when the label itself no longer exists.
    pub async fn detach(&self, owner_id: i64, note_id: i64, label_id: i64) -> Result<DetachOutcome> {
        self.owned_note(owner_id, note_id).await?;
        validate_id(label_id, "label")?;

        let detached = self
            .notes
            .detach_label(note_id, label_id, Utc::now())
            .await?;
        if detached {
            info!(
                subsystem = "labels",
                component = "associations",
                op = "detach",
                note_id,
                label_id,
                owner_id,
                "Label detached"
            );
        }
        Ok(DetachOutcome { detached })
    }

    /// Non-deleted notes carrying a label the caller owns.
    pub async fn notes_with_label(&self, owner_id: i64, label_id: i64) -> Result<Vec<Note>> {
        validate_owner(owner_id)?;
        validate_id(label_id, "label")?;
        let label = self
            .labels
            .fetch(label_id)
            .await?
            .ok_or(Error::LabelNotFound(label_id))?;
        label.ensure_owned_by(owner_id)?;
        self.notes.list_with_label(owner_id, label_id).await
    }
}
