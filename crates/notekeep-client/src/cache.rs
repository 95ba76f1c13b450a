//! Client-side note cache.
//!
//! Holds the last fetched [`Snapshot`] of the caller's active notes, trash and
//! labels. Mutations go through the cache: the request is sent, the snapshot
//! is invalidated and refetched, and subscribers see the new value.

use std::future::Future;

use tokio::sync::watch;
use tracing::{debug, warn};

use notekeep_core::{
    BulkDeleteOutcome, CreateNoteRequest, DetachOutcome, EmptyTrashOutcome, Label, Note,
    NoteViews, UpdateNoteRequest,
};

use crate::client::NotekeepClient;
use crate::error::Result;

/// Cached state of one user's board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Non-deleted notes, archived ones included, in API order.
    pub active: Vec<Note>,
    /// Trashed notes, most recently deleted first.
    pub trashed: Vec<Note>,
    pub labels: Vec<Label>,
    /// False until the first fetch and after every invalidation.
    pub fresh: bool,
}

impl Snapshot {
    /// Pinned, others and archived, as the board shows them.
    pub fn views(&self) -> NoteViews {
        NoteViews::partition(self.active.clone())
    }

    /// Active notes carrying `label_id`.
    pub fn with_label(&self, label_id: i64) -> Vec<Note> {
        self.active
            .iter()
            .filter(|n| n.has_label(label_id))
            .cloned()
            .collect()
    }

    pub fn note(&self, id: i64) -> Option<&Note> {
        self.active
            .iter()
            .chain(self.trashed.iter())
            .find(|n| n.id == id)
    }
}

/// Note cache with refetch-on-mutation.
pub struct NoteCache {
    client: NotekeepClient,
    tx: watch::Sender<Snapshot>,
}

impl NoteCache {
    pub fn new(client: NotekeepClient) -> Self {
        let (tx, _rx) = watch::channel(Snapshot::default());
        Self { client, tx }
    }

    pub fn client(&self) -> &NotekeepClient {
        &self.client
    }

    /// Current snapshot, possibly stale.
    pub fn get(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    /// Receiver notified on every refresh and invalidation.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    /// Mark the snapshot stale; the next [`load`](Self::load) refetches.
    pub fn invalidate(&self) {
        self.tx.send_modify(|s| s.fresh = false);
    }

    /// Cached snapshot when fresh, otherwise a refetch.
    pub async fn load(&self) -> Result<Snapshot> {
        let current = self.get();
        if current.fresh {
            return Ok(current);
        }
        self.refresh().await
    }

    /// Fetch notes, trash and labels concurrently and publish the result.
    pub async fn refresh(&self) -> Result<Snapshot> {
        let (active, trashed, labels) = futures::try_join!(
            self.client.list_notes(),
            self.client.list_trash(),
            self.client.list_labels()
        )?;

        let snapshot = Snapshot {
            active,
            trashed,
            labels,
            fresh: true,
        };
        debug!(
            subsystem = "client",
            component = "cache",
            active = snapshot.active.len(),
            trashed = snapshot.trashed.len(),
            labels = snapshot.labels.len(),
            "Cache refreshed"
        );
        self.tx.send_replace(snapshot.clone());
        Ok(snapshot)
    }

    /// Run a mutation, then invalidate and refetch.
    ///
    /// A failed mutation leaves the snapshot untouched. Once the server has
    /// accepted the mutation its result is returned even if the refetch
    /// fails; the snapshot then stays stale until the next `load`.
    async fn mutate<T, F>(&self, op: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let out = op.await?;
        self.invalidate();
        if let Err(e) = self.refresh().await {
            warn!(
                subsystem = "client",
                component = "cache",
                error = %e,
                "Refetch after mutation failed, snapshot left stale"
            );
        }
        Ok(out)
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Note>> {
        self.client.search(query).await
    }

    pub async fn create_note(&self, req: &CreateNoteRequest) -> Result<Note> {
        self.mutate(self.client.create_note(req)).await
    }

    pub async fn update_note(&self, id: i64, req: &UpdateNoteRequest) -> Result<Note> {
        self.mutate(self.client.update_note(id, req)).await
    }

    pub async fn toggle_pin(&self, id: i64) -> Result<Note> {
        self.mutate(self.client.toggle_pin(id)).await
    }

    pub async fn toggle_archive(&self, id: i64) -> Result<Note> {
        self.mutate(self.client.toggle_archive(id)).await
    }

    pub async fn toggle_trash(&self, id: i64) -> Result<Note> {
        self.mutate(self.client.toggle_trash(id)).await
    }

    pub async fn update_color(&self, id: i64, color: &str) -> Result<Note> {
        self.mutate(self.client.update_color(id, color)).await
    }

    pub async fn delete_note(&self, id: i64) -> Result<Note> {
        self.mutate(self.client.delete_note(id)).await
    }

    pub async fn restore_note(&self, id: i64) -> Result<Note> {
        self.mutate(self.client.restore_note(id)).await
    }

    pub async fn copy_note(&self, id: i64) -> Result<Note> {
        self.mutate(self.client.copy_note(id)).await
    }

    pub async fn permanent_delete(&self, id: i64) -> Result<()> {
        self.mutate(self.client.permanent_delete(id)).await
    }

    pub async fn empty_trash(&self) -> Result<EmptyTrashOutcome> {
        self.mutate(self.client.empty_trash()).await
    }

    pub async fn bulk_delete(&self, note_ids: &[i64]) -> Result<BulkDeleteOutcome> {
        self.mutate(self.client.bulk_delete(note_ids)).await
    }

    pub async fn attach_label(&self, note_id: i64, label_id: i64) -> Result<Note> {
        self.mutate(self.client.attach_label(note_id, label_id)).await
    }

    pub async fn detach_label(&self, note_id: i64, label_id: i64) -> Result<DetachOutcome> {
        self.mutate(self.client.detach_label(note_id, label_id)).await
    }

    pub async fn create_label(&self, name: &str) -> Result<Label> {
        self.mutate(self.client.create_label(name)).await
    }

    pub async fn update_label(&self, id: i64, name: &str) -> Result<Label> {
        self.mutate(self.client.update_label(id, name)).await
    }

    pub async fn delete_label(&self, id: i64) -> Result<()> {
        self.mutate(self.client.delete_label(id)).await
    }
}
