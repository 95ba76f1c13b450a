//! In-memory repository implementation for deterministic testing.
//!
//! Implements both [`NoteRepository`] and [`LabelRepository`] over one shared
//! state, mirroring the PostgreSQL constraints: one association per
//! (note, label) pair, case-insensitive unique label names per owner and
//! cascading deletes.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use notekeep_core::memory::InMemoryStore;
//! use notekeep_core::{LabelRepository, NoteRepository};
//!
//! let store = InMemoryStore::new();
//! let notes: Arc<dyn NoteRepository> = Arc::new(store.clone());
//! let labels: Arc<dyn LabelRepository> = Arc::new(store);
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::models::*;
use crate::traits::{LabelRepository, NoteRepository};
use crate::validation::label_names_equal;

/// Shared in-memory store. Clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

#[derive(Default)]
struct State {
    notes: BTreeMap<i64, Note>,
    labels: BTreeMap<i64, Label>,
    links: BTreeMap<(i64, i64), DateTime<Utc>>,
    next_note_id: i64,
    next_label_id: i64,
}

impl State {
    /// Note with its label set joined in, labels sorted by name.
    fn hydrate(&self, note: &Note) -> Note {
        let mut labels: Vec<LabelSummary> = self
            .links
            .keys()
            .filter(|(note_id, _)| *note_id == note.id)
            .filter_map(|(_, label_id)| self.labels.get(label_id))
            .map(Label::summary)
            .collect();
        labels.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Note {
            labels,
            ..note.clone()
        }
    }

    fn collect<F: Fn(&Note) -> bool>(&self, keep: F) -> Vec<Note> {
        self.notes
            .values()
            .filter(|n| keep(n))
            .map(|n| self.hydrate(n))
            .collect()
    }

    fn name_taken(&self, owner_id: i64, name: &str, exclude_id: Option<i64>) -> bool {
        self.labels.values().any(|l| {
            l.owner_id == owner_id
                && Some(l.id) != exclude_id
                && label_names_equal(&l.name, name)
        })
    }

    fn touch(&mut self, note_id: i64, at: DateTime<Utc>) {
        if let Some(note) = self.notes.get_mut(&note_id) {
            note.updated_at = Some(at);
        }
    }

    fn write_columns(&mut self, note: &Note) -> Result<()> {
        let stored = self
            .notes
            .get_mut(&note.id)
            .ok_or(Error::NoteNotFound(note.id))?;
        // owner and creation time are immutable
        stored.title = note.title.clone();
        stored.content = note.content.clone();
        stored.color = note.color.clone();
        stored.is_pinned = note.is_pinned;
        stored.is_archived = note.is_archived;
        stored.is_deleted = note.is_deleted;
        stored.updated_at = note.updated_at;
        stored.deleted_at = note.deleted_at;
        Ok(())
    }
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| Error::Internal("in-memory store lock poisoned".to_string()))
    }

    /// Number of notes held, trashed ones included.
    pub fn note_count(&self) -> usize {
        self.lock().map(|s| s.notes.len()).unwrap_or(0)
    }

    /// Number of note/label associations held.
    pub fn association_count(&self) -> usize {
        self.lock().map(|s| s.links.len()).unwrap_or(0)
    }
}

#[async_trait]
impl NoteRepository for InMemoryStore {
    async fn fetch(&self, id: i64) -> Result<Option<Note>> {
        let state = self.lock()?;
        Ok(state.notes.get(&id).map(|n| state.hydrate(n)))
    }

    async fn fetch_many(&self, ids: &[i64]) -> Result<Vec<Note>> {
        let state = self.lock()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.notes.get(id))
            .map(|n| state.hydrate(n))
            .collect())
    }

    async fn list(&self, owner_id: i64, filter: NoteFilter) -> Result<Vec<Note>> {
        let state = self.lock()?;
        let mut notes = state.collect(|n| n.owner_id == owner_id && filter.includes(n));
        match filter {
            NoteFilter::Trashed => notes.sort_by(cmp_trashed),
            NoteFilter::Active | NoteFilter::Archived => notes.sort_by(cmp_active),
        }
        Ok(notes)
    }

    async fn list_with_label(&self, owner_id: i64, label_id: i64) -> Result<Vec<Note>> {
        let state = self.lock()?;
        let mut notes = state.collect(|n| {
            n.owner_id == owner_id && !n.is_deleted && state.links.contains_key(&(n.id, label_id))
        });
        notes.sort_by(cmp_active);
        Ok(notes)
    }

    async fn search(&self, owner_id: i64, query: &str) -> Result<Vec<Note>> {
        let state = self.lock()?;
        let mut notes = state.collect(|n| n.owner_id == owner_id && !n.is_deleted && n.matches(query));
        notes.sort_by(cmp_active);
        Ok(notes)
    }

    async fn insert(&self, note: NewNote) -> Result<Note> {
        let mut state = self.lock()?;
        if let Some(missing) = note
            .label_ids
            .iter()
            .find(|id| !state.labels.contains_key(id))
        {
            return Err(Error::LabelNotFound(*missing));
        }

        state.next_note_id += 1;
        let id = state.next_note_id;
        let stored = Note {
            id,
            owner_id: note.owner_id,
            title: note.title,
            content: note.content,
            color: note.color,
            is_pinned: false,
            is_archived: false,
            is_deleted: false,
            created_at: note.created_at,
            updated_at: None,
            deleted_at: None,
            labels: Vec::new(),
        };
        state.notes.insert(id, stored);
        for label_id in note.label_ids {
            state.links.entry((id, label_id)).or_insert(note.created_at);
        }
        let created = state.hydrate(&state.notes[&id]);
        Ok(created)
    }

    async fn save(&self, note: &Note) -> Result<()> {
        self.lock()?.write_columns(note)
    }

    async fn save_with_labels(
        &self,
        note: &Note,
        label_ids: &[i64],
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut state = self.lock()?;
        if !state.notes.contains_key(&note.id) {
            return Err(Error::NoteNotFound(note.id));
        }
        if let Some(missing) = label_ids.iter().find(|id| !state.labels.contains_key(id)) {
            return Err(Error::LabelNotFound(*missing));
        }

        state.write_columns(note)?;
        let existing: BTreeMap<i64, DateTime<Utc>> = state
            .links
            .iter()
            .filter(|((n, _), _)| *n == note.id)
            .map(|((_, l), created)| (*l, *created))
            .collect();
        state.links.retain(|(n, _), _| *n != note.id);
        for label_id in label_ids {
            let created = existing.get(label_id).copied().unwrap_or(at);
            state.links.insert((note.id, *label_id), created);
        }
        Ok(())
    }

    async fn attach_label(&self, note_id: i64, label_id: i64, at: DateTime<Utc>) -> Result<bool> {
        let mut state = self.lock()?;
        if !state.notes.contains_key(&note_id) {
            return Err(Error::NoteNotFound(note_id));
        }
        if !state.labels.contains_key(&label_id) {
            return Err(Error::LabelNotFound(label_id));
        }
        if state.links.contains_key(&(note_id, label_id)) {
            return Ok(false);
        }
        state.links.insert((note_id, label_id), at);
        state.touch(note_id, at);
        Ok(true)
    }

    async fn detach_label(&self, note_id: i64, label_id: i64, at: DateTime<Utc>) -> Result<bool> {
        let mut state = self.lock()?;
        if state.links.remove(&(note_id, label_id)).is_none() {
            return Ok(false);
        }
        state.touch(note_id, at);
        Ok(true)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut state = self.lock()?;
        state.links.retain(|(n, _), _| *n != id);
        Ok(state.notes.remove(&id).is_some())
    }

    async fn delete_trashed(&self, owner_id: i64) -> Result<u64> {
        let mut state = self.lock()?;
        let doomed: Vec<i64> = state
            .notes
            .values()
            .filter(|n| n.owner_id == owner_id && n.is_deleted)
            .map(|n| n.id)
            .collect();
        for id in &doomed {
            state.notes.remove(id);
        }
        state.links.retain(|(n, _), _| !doomed.contains(n));
        Ok(doomed.len() as u64)
    }
}

#[async_trait]
impl LabelRepository for InMemoryStore {
    async fn fetch(&self, id: i64) -> Result<Option<Label>> {
        Ok(self.lock()?.labels.get(&id).cloned())
    }

    async fn fetch_for_owner(&self, owner_id: i64, ids: &[i64]) -> Result<Vec<Label>> {
        let state = self.lock()?;
        Ok(ids
            .iter()
            .filter_map(|id| state.labels.get(id))
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn list(&self, owner_id: i64) -> Result<Vec<Label>> {
        let state = self.lock()?;
        let mut labels: Vec<Label> = state
            .labels
            .values()
            .filter(|l| l.owner_id == owner_id)
            .cloned()
            .collect();
        labels.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(labels)
    }

    async fn exists_for_owner(
        &self,
        name: &str,
        owner_id: i64,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        Ok(self.lock()?.name_taken(owner_id, name, exclude_id))
    }

    async fn insert(&self, label: NewLabel) -> Result<Label> {
        let mut state = self.lock()?;
        if state.name_taken(label.owner_id, &label.name, None) {
            return Err(Error::Validation(
                "A label with this name already exists".to_string(),
            ));
        }
        state.next_label_id += 1;
        let created = Label {
            id: state.next_label_id,
            owner_id: label.owner_id,
            name: label.name,
            created_at: label.created_at,
        };
        state.labels.insert(created.id, created.clone());
        Ok(created)
    }

    async fn rename(&self, id: i64, name: &str) -> Result<()> {
        let mut state = self.lock()?;
        let owner_id = state
            .labels
            .get(&id)
            .map(|l| l.owner_id)
            .ok_or(Error::LabelNotFound(id))?;
        if state.name_taken(owner_id, name, Some(id)) {
            return Err(Error::Validation(
                "A label with this name already exists".to_string(),
            ));
        }
        if let Some(label) = state.labels.get_mut(&id) {
            label.name = name.to_string();
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut state = self.lock()?;
        state.links.retain(|(_, l), _| *l != id);
        Ok(state.labels.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_note(owner_id: i64, title: &str, label_ids: Vec<i64>) -> NewNote {
        NewNote {
            owner_id,
            title: Some(title.to_string()),
            content: None,
            color: "#FFFFFF".to_string(),
            label_ids,
            created_at: Utc::now(),
        }
    }

    fn new_label(owner_id: i64, name: &str) -> NewLabel {
        NewLabel {
            owner_id,
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_labels() {
        let store = InMemoryStore::new();
        let work = LabelRepository::insert(&store, new_label(1, "Work")).await.unwrap();
        let note = NoteRepository::insert(&store, new_note(1, "Plan", vec![work.id]))
            .await
            .unwrap();

        assert_eq!(note.id, 1);
        assert_eq!(note.labels, vec![work.summary()]);
        assert_eq!(store.association_count(), 1);
    }

    #[tokio::test]
    async fn test_attach_twice_keeps_one_association() {
        let store = InMemoryStore::new();
        let label = LabelRepository::insert(&store, new_label(1, "Work")).await.unwrap();
        let note = NoteRepository::insert(&store, new_note(1, "Plan", vec![]))
            .await
            .unwrap();

        assert!(store.attach_label(note.id, label.id, Utc::now()).await.unwrap());
        assert!(!store.attach_label(note.id, label.id, Utc::now()).await.unwrap());
        assert_eq!(store.association_count(), 1);
    }

    #[tokio::test]
    async fn test_save_with_missing_label_writes_nothing() {
        let store = InMemoryStore::new();
        let work = LabelRepository::insert(&store, new_label(1, "Work")).await.unwrap();
        let note = NoteRepository::insert(&store, new_note(1, "Plan", vec![work.id]))
            .await
            .unwrap();

        let mut edited = note.clone();
        edited.title = Some("Changed".to_string());
        edited.toggle_pin(Utc::now());
        let err = store
            .save_with_labels(&edited, &[work.id, 42], Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::LabelNotFound(42)));

        let reloaded = NoteRepository::fetch(&store, note.id).await.unwrap().unwrap();
        assert_eq!(reloaded, note);
    }

    #[tokio::test]
    async fn test_save_with_labels_keeps_existing_pairs() {
        let store = InMemoryStore::new();
        let work = LabelRepository::insert(&store, new_label(1, "Work")).await.unwrap();
        let home = LabelRepository::insert(&store, new_label(1, "Home")).await.unwrap();
        let mut note = NoteRepository::insert(&store, new_note(1, "Plan", vec![work.id]))
            .await
            .unwrap();
        let linked_at = store.lock().unwrap().links[&(note.id, work.id)];

        note.title = Some("Changed".to_string());
        store
            .save_with_labels(&note, &[home.id, work.id], Utc::now())
            .await
            .unwrap();

        let reloaded = NoteRepository::fetch(&store, note.id).await.unwrap().unwrap();
        assert_eq!(reloaded.title.as_deref(), Some("Changed"));
        assert_eq!(reloaded.labels.len(), 2);
        assert_eq!(store.lock().unwrap().links[&(note.id, work.id)], linked_at);
    }

    #[tokio::test]
    async fn test_label_delete_cascades_associations() {
        let store = InMemoryStore::new();
        let label = LabelRepository::insert(&store, new_label(1, "Work")).await.unwrap();
        let note = NoteRepository::insert(&store, new_note(1, "Plan", vec![label.id]))
            .await
            .unwrap();

        assert!(LabelRepository::delete(&store, label.id).await.unwrap());
        let reloaded = NoteRepository::fetch(&store, note.id).await.unwrap().unwrap();
        assert!(reloaded.labels.is_empty());
        assert_eq!(store.association_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_label_name_rejected_per_owner() {
        let store = InMemoryStore::new();
        LabelRepository::insert(&store, new_label(1, "Work")).await.unwrap();

        let dup = LabelRepository::insert(&store, new_label(1, "WORK")).await;
        assert!(matches!(dup, Err(Error::Validation(_))));

        // another owner may reuse the name
        assert!(LabelRepository::insert(&store, new_label(2, "work")).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_trashed_only_touches_owner_trash() {
        let store = InMemoryStore::new();
        let mut a = NoteRepository::insert(&store, new_note(1, "a", vec![])).await.unwrap();
        let mut b = NoteRepository::insert(&store, new_note(2, "b", vec![])).await.unwrap();
        NoteRepository::insert(&store, new_note(1, "c", vec![])).await.unwrap();

        a.trash(Utc::now());
        b.trash(Utc::now());
        store.save(&a).await.unwrap();
        store.save(&b).await.unwrap();

        assert_eq!(store.delete_trashed(1).await.unwrap(), 1);
        assert_eq!(store.note_count(), 2);
    }
}
