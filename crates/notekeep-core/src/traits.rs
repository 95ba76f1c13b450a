//! Storage traits for notekeep.
//!
//! The services only talk to storage through these traits, so the same
//! lifecycle rules run against PostgreSQL in production and against the
//! in-memory store in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::*;

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Repository for notes and their label associations.
///
/// Every returned [`Note`] carries its current label set.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Fetch a note by id, whoever owns it.
    async fn fetch(&self, id: i64) -> Result<Option<Note>>;

    /// Fetch every existing note among `ids` (missing ids are simply absent).
    async fn fetch_many(&self, ids: &[i64]) -> Result<Vec<Note>>;

    /// List an owner's notes. Active and archived listings are pinned-first then
    /// most-recent; the trash is most-recently-deleted first.
    async fn list(&self, owner_id: i64, filter: NoteFilter) -> Result<Vec<Note>>;

    /// Non-deleted notes of an owner carrying `label_id`, in active order.
    async fn list_with_label(&self, owner_id: i64, label_id: i64) -> Result<Vec<Note>>;

    /// Non-deleted notes whose title or content contains `query` (case-insensitive).
    async fn search(&self, owner_id: i64, query: &str) -> Result<Vec<Note>>;

    /// Insert a note and its label associations in one transaction.
    async fn insert(&self, note: NewNote) -> Result<Note>;

    /// Persist the scalar fields of an existing note (labels untouched).
    async fn save(&self, note: &Note) -> Result<()>;

    /// Persist the scalar fields and replace the label set in one transaction.
    ///
    /// Pairs that stay keep their `created_at`; new ones get `at`. When any
    /// label is missing nothing is written and `LabelNotFound` is returned.
    async fn save_with_labels(&self, note: &Note, label_ids: &[i64], at: DateTime<Utc>)
        -> Result<()>;

    /// Create the association unless it exists; bumps `updated_at` when created.
    ///
    /// Returns false when the pair was already associated.
    async fn attach_label(&self, note_id: i64, label_id: i64, at: DateTime<Utc>) -> Result<bool>;

    /// Remove the association; bumps `updated_at` when removed.
    ///
    /// Returns false when the pair was not associated.
    async fn detach_label(&self, note_id: i64, label_id: i64, at: DateTime<Utc>) -> Result<bool>;

    /// Permanently delete a note and its associations.
    async fn delete(&self, id: i64) -> Result<bool>;

    /// Permanently delete every trashed note of an owner in one statement.
    async fn delete_trashed(&self, owner_id: i64) -> Result<u64>;
}

// =============================================================================
// LABEL REPOSITORY
// =============================================================================

/// Repository for labels.
#[async_trait]
pub trait LabelRepository: Send + Sync {
    /// Fetch a label by id, whoever owns it.
    async fn fetch(&self, id: i64) -> Result<Option<Label>>;

    /// Fetch the labels among `ids` that belong to `owner_id`.
    async fn fetch_for_owner(&self, owner_id: i64, ids: &[i64]) -> Result<Vec<Label>>;

    /// All labels of an owner, ordered by name.
    async fn list(&self, owner_id: i64) -> Result<Vec<Label>>;

    /// Case-insensitive name lookup within an owner, optionally ignoring one label.
    async fn exists_for_owner(
        &self,
        name: &str,
        owner_id: i64,
        exclude_id: Option<i64>,
    ) -> Result<bool>;

    /// Insert a label. A concurrent duplicate name surfaces as `Validation`.
    async fn insert(&self, label: NewLabel) -> Result<Label>;

    /// Rename a label. A concurrent duplicate name surfaces as `Validation`.
    async fn rename(&self, id: i64, name: &str) -> Result<()>;

    /// Delete a label; its note associations go with it.
    async fn delete(&self, id: i64) -> Result<bool>;
}
