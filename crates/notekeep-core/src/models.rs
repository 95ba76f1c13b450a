//! Core data models for notekeep.
//!
//! These types are shared across all notekeep crates: the repositories
//! persist them, the services mutate them and the API and client
//! serialize them (camelCase on the wire).

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// =============================================================================
// OWNERSHIP
// =============================================================================

/// An entity exclusively owned by one user.
pub trait Owned {
    fn owner_id(&self) -> i64;

    /// Human name used in access-denied messages.
    fn kind() -> &'static str;

    /// Fail with `Unauthorized` unless `owner_id` owns this entity.
    fn ensure_owned_by(&self, owner_id: i64) -> Result<()> {
        if self.owner_id() != owner_id {
            return Err(Error::Unauthorized(format!(
                "Access denied to this {}",
                Self::kind()
            )));
        }
        Ok(())
    }
}

// =============================================================================
// LABEL TYPES
// =============================================================================

/// A user-defined label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Label {
    pub id: i64,
    #[serde(rename = "userId")]
    pub owner_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Label {
    pub fn summary(&self) -> LabelSummary {
        LabelSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

impl Owned for Label {
    fn owner_id(&self) -> i64 {
        self.owner_id
    }

    fn kind() -> &'static str {
        "label"
    }
}

/// Label as embedded in a note projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LabelSummary {
    pub id: i64,
    pub name: String,
}

/// Association row between a note and a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteLabel {
    pub note_id: i64,
    pub label_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Label to insert.
#[derive(Debug, Clone)]
pub struct NewLabel {
    pub owner_id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// NOTE TYPES
// =============================================================================

/// A note with its label set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    #[serde(rename = "userId")]
    pub owner_id: i64,
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: String,
    pub is_pinned: bool,
    pub is_archived: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<LabelSummary>,
}

impl Owned for Note {
    fn owner_id(&self) -> i64 {
        self.owner_id
    }

    fn kind() -> &'static str {
        "note"
    }
}

impl Note {
    /// Timestamp used for recency ordering.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    pub fn has_label(&self, label_id: i64) -> bool {
        self.labels.iter().any(|l| l.id == label_id)
    }

    pub fn label_ids(&self) -> Vec<i64> {
        self.labels.iter().map(|l| l.id).collect()
    }

    /// Case-insensitive substring match on title or content.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        let contains = |field: &Option<String>| {
            field
                .as_deref()
                .map(|text| text.to_lowercase().contains(&needle))
                .unwrap_or(false)
        };
        contains(&self.title) || contains(&self.content)
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = Some(at);
    }

    pub fn toggle_pin(&mut self, at: DateTime<Utc>) {
        self.is_pinned = !self.is_pinned;
        self.touch(at);
    }

    pub fn toggle_archive(&mut self, at: DateTime<Utc>) {
        self.is_archived = !self.is_archived;
        self.touch(at);
    }

    /// Move to trash. Returns false (and changes nothing) when already trashed.
    ///
    /// Pin and archive flags are kept so a restore brings the note back as it was.
    pub fn trash(&mut self, at: DateTime<Utc>) -> bool {
        if self.is_deleted {
            return false;
        }
        self.is_deleted = true;
        self.deleted_at = Some(at);
        self.touch(at);
        true
    }

    /// Take out of trash. Returns false (and changes nothing) when not trashed.
    pub fn restore(&mut self, at: DateTime<Utc>) -> bool {
        if !self.is_deleted {
            return false;
        }
        self.is_deleted = false;
        self.deleted_at = None;
        self.touch(at);
        true
    }

    /// Color must already be validated.
    pub fn set_color(&mut self, color: String, at: DateTime<Utc>) {
        self.color = color;
        self.touch(at);
    }
}

/// Sort for active views: pinned first, then most recently modified.
pub fn cmp_active(a: &Note, b: &Note) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| b.last_modified().cmp(&a.last_modified()))
        .then_with(|| b.id.cmp(&a.id))
}

/// Sort for the trash: most recently trashed first.
pub fn cmp_trashed(a: &Note, b: &Note) -> Ordering {
    b.deleted_at
        .cmp(&a.deleted_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// Note to insert, with the labels to associate in the same transaction.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub owner_id: i64,
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: String,
    pub label_ids: Vec<i64>,
    pub created_at: DateTime<Utc>,
}

/// Which slice of an owner's notes to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteFilter {
    /// Every non-deleted note (pinned, others and archived).
    Active,
    /// Archived, non-deleted notes.
    Archived,
    /// Deleted notes.
    Trashed,
}

impl NoteFilter {
    pub fn includes(&self, note: &Note) -> bool {
        match self {
            NoteFilter::Active => !note.is_deleted,
            NoteFilter::Archived => note.is_archived && !note.is_deleted,
            NoteFilter::Trashed => note.is_deleted,
        }
    }
}

/// Active notes partitioned the way the board shows them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NoteViews {
    pub pinned: Vec<Note>,
    pub others: Vec<Note>,
    pub archived: Vec<Note>,
}

impl NoteViews {
    /// Deleted notes are dropped whatever their pin/archive flags.
    pub fn partition<I: IntoIterator<Item = Note>>(notes: I) -> Self {
        let mut views = NoteViews::default();
        for note in notes.into_iter().filter(|n| !n.is_deleted) {
            if note.is_archived {
                views.archived.push(note);
            } else if note.is_pinned {
                views.pinned.push(note);
            } else {
                views.others.push(note);
            }
        }
        views
    }
}

// =============================================================================
// REQUEST / RESPONSE TYPES
// =============================================================================

/// Body for creating a note.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: Option<String>,
    pub label_ids: Option<Vec<i64>>,
}

/// Partial note update; only present fields change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: Option<String>,
    pub is_pinned: Option<bool>,
    pub is_archived: Option<bool>,
    pub is_deleted: Option<bool>,
    /// Replaces the whole label set when present.
    pub label_ids: Option<Vec<i64>>,
}

/// Body for changing a note color.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateColorRequest {
    pub color: String,
}

/// Body for trashing several notes at once.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    pub note_ids: Vec<i64>,
}

/// One id a bulk operation skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BulkFailure {
    pub id: i64,
    pub reason: String,
}

/// Per-id result of a bulk delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BulkDeleteOutcome {
    pub deleted: Vec<i64>,
    pub failed: Vec<BulkFailure>,
}

/// Result of emptying the trash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmptyTrashOutcome {
    pub deleted_count: u64,
}

/// Result of detaching a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DetachOutcome {
    /// False when the label was not attached (no-op).
    pub detached: bool,
}

/// Body for creating a label.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateLabelRequest {
    pub name: Option<String>,
}

/// Body for renaming a label.
#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateLabelRequest {
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn note(id: i64) -> Note {
        Note {
            id,
            owner_id: 1,
            title: Some("Groceries".to_string()),
            content: Some("Milk, eggs".to_string()),
            color: "#FFFFFF".to_string(),
            is_pinned: false,
            is_archived: false,
            is_deleted: false,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
            labels: vec![],
        }
    }

    #[test]
    fn test_note_serializes_camel_case() {
        let json = serde_json::to_value(note(1)).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["isPinned"], false);
        assert!(json.get("deletedAt").is_some());
        assert!(json.get("owner_id").is_none());
    }

    #[test]
    fn test_ensure_owned_by() {
        let n = note(1);
        assert!(n.ensure_owned_by(1).is_ok());
        let err = n.ensure_owned_by(2).unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Access denied to this note");
    }

    #[test]
    fn test_trash_then_restore_preserves_flags() {
        let mut n = note(1);
        n.is_pinned = true;
        n.is_archived = true;
        let now = Utc::now();

        assert!(n.trash(now));
        assert!(n.is_deleted);
        assert_eq!(n.deleted_at, Some(now));
        assert!(n.is_pinned && n.is_archived);

        assert!(n.restore(now));
        assert!(!n.is_deleted);
        assert!(n.deleted_at.is_none());
        assert!(n.is_pinned && n.is_archived);
    }

    #[test]
    fn test_trash_is_idempotent() {
        let mut n = note(1);
        let first = Utc::now();
        assert!(n.trash(first));
        assert!(!n.trash(first + Duration::seconds(5)));
        assert_eq!(n.deleted_at, Some(first));
    }

    #[test]
    fn test_restore_active_note_is_noop() {
        let mut n = note(1);
        assert!(!n.restore(Utc::now()));
        assert!(n.updated_at.is_none());
    }

    #[test]
    fn test_double_toggle_pin_restores_value() {
        let mut n = note(1);
        n.toggle_pin(Utc::now());
        assert!(n.is_pinned);
        n.toggle_pin(Utc::now());
        assert!(!n.is_pinned);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        let n = note(1);
        assert!(n.matches("grocer"));
        assert!(n.matches("EGGS"));
        assert!(!n.matches("bread"));

        let mut untitled = note(2);
        untitled.title = None;
        untitled.content = None;
        assert!(!untitled.matches("a"));
    }

    #[test]
    fn test_cmp_active_pinned_first_then_recent() {
        let base = Utc::now();
        let mut old_pinned = note(1);
        old_pinned.is_pinned = true;
        old_pinned.created_at = base - Duration::days(3);

        let mut fresh = note(2);
        fresh.created_at = base;

        let mut edited = note(3);
        edited.created_at = base - Duration::days(5);
        edited.updated_at = Some(base + Duration::minutes(1));

        let mut notes = vec![fresh.clone(), edited.clone(), old_pinned.clone()];
        notes.sort_by(cmp_active);
        let ids: Vec<i64> = notes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn test_cmp_trashed_most_recent_first() {
        let base = Utc::now();
        let mut a = note(1);
        a.deleted_at = Some(base - Duration::hours(1));
        let mut b = note(2);
        b.deleted_at = Some(base);

        let mut notes = vec![a, b];
        notes.sort_by(cmp_trashed);
        assert_eq!(notes[0].id, 2);
    }

    #[test]
    fn test_filter_excludes_deleted_from_active_views() {
        let mut n = note(1);
        n.is_archived = true;
        n.is_deleted = true;
        assert!(!NoteFilter::Active.includes(&n));
        assert!(!NoteFilter::Archived.includes(&n));
        assert!(NoteFilter::Trashed.includes(&n));
    }

    #[test]
    fn test_views_partition() {
        let mut pinned = note(1);
        pinned.is_pinned = true;
        let other = note(2);
        let mut archived = note(3);
        archived.is_archived = true;
        archived.is_pinned = true;
        let mut deleted = note(4);
        deleted.is_deleted = true;
        deleted.is_pinned = true;

        let views = NoteViews::partition(vec![pinned, other, archived, deleted]);
        assert_eq!(views.pinned.len(), 1);
        assert_eq!(views.pinned[0].id, 1);
        assert_eq!(views.others[0].id, 2);
        assert_eq!(views.archived[0].id, 3);
    }

    #[test]
    fn test_update_request_deserializes_partial_body() {
        let req: UpdateNoteRequest =
            serde_json::from_str(r##"{"color":"#abc","labelIds":[1,2]}"##).unwrap();
        assert_eq!(req.color.as_deref(), Some("#abc"));
        assert_eq!(req.label_ids, Some(vec![1, 2]));
        assert!(req.title.is_none());
        assert!(req.is_pinned.is_none());
    }
}
