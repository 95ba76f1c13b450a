//! Note repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use notekeep_core::{Error, LabelSummary, NewNote, Note, NoteFilter, NoteRepository, Result};

use crate::escape_like;

const NOTE_COLUMNS: &str = "n.id, n.owner_id, n.title, n.content, n.color, n.is_pinned, \
     n.is_archived, n.is_deleted, n.created_at, n.updated_at, n.deleted_at";

const ACTIVE_ORDER: &str = "n.is_pinned DESC, COALESCE(n.updated_at, n.created_at) DESC, n.id DESC";

const TRASH_ORDER: &str = "n.deleted_at DESC, n.id DESC";

/// PostgreSQL implementation of NoteRepository.
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn note_from_row(row: &PgRow) -> Note {
        Note {
            id: row.get("id"),
            owner_id: row.get("owner_id"),
            title: row.get("title"),
            content: row.get("content"),
            color: row.get("color"),
            is_pinned: row.get("is_pinned"),
            is_archived: row.get("is_archived"),
            is_deleted: row.get("is_deleted"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
            deleted_at: row.get("deleted_at"),
            labels: Vec::new(),
        }
    }

    /// Load the label sets of `notes` in one query (no N+1).
    async fn with_labels(&self, mut notes: Vec<Note>) -> Result<Vec<Note>> {
        if notes.is_empty() {
            return Ok(notes);
        }
        let ids: Vec<i64> = notes.iter().map(|n| n.id).collect();

        let rows = sqlx::query(
            r#"
            SELECT nl.note_id, l.id, l.name
            FROM note_label nl
            JOIN label l ON l.id = nl.label_id
            WHERE nl.note_id = ANY($1)
            ORDER BY LOWER(l.name), l.id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut by_note: HashMap<i64, Vec<LabelSummary>> = HashMap::new();
        for row in rows {
            by_note
                .entry(row.get("note_id"))
                .or_default()
                .push(LabelSummary {
                    id: row.get("id"),
                    name: row.get("name"),
                });
        }

        for note in &mut notes {
            note.labels = by_note.remove(&note.id).unwrap_or_default();
        }
        Ok(notes)
    }

    async fn bump_updated_at(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        note_id: i64,
        at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query("UPDATE note SET updated_at = $2 WHERE id = $1")
            .bind(note_id)
            .bind(at)
            .execute(&mut **tx)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    /// Write the mutable columns of `note`; returns the affected row count.
    async fn write_columns<'e, E>(executor: E, note: &Note) -> Result<u64>
    where
        E: sqlx::PgExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            UPDATE note
            SET title = $2, content = $3, color = $4,
                is_pinned = $5, is_archived = $6, is_deleted = $7,
                updated_at = $8, deleted_at = $9
            WHERE id = $1
            "#,
        )
        .bind(note.id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.color)
        .bind(note.is_pinned)
        .bind(note.is_archived)
        .bind(note.is_deleted)
        .bind(note.updated_at)
        .bind(note.deleted_at)
        .execute(executor)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}

/// Translate a foreign key violation on `note_label` into the entity that is missing.
fn association_error(e: sqlx::Error, note_id: i64, label_id: i64) -> Error {
    let missing_label = e
        .as_database_error()
        .filter(|d| d.is_foreign_key_violation())
        .map(|d| d.constraint().unwrap_or_default().contains("label_id"));
    match missing_label {
        Some(true) => Error::LabelNotFound(label_id),
        Some(false) => Error::NoteNotFound(note_id),
        None => Error::Database(e),
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn fetch(&self, id: i64) -> Result<Option<Note>> {
        let row = sqlx::query(&format!("SELECT {} FROM note n WHERE n.id = $1", NOTE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        match row {
            Some(row) => {
                let mut notes = self.with_labels(vec![Self::note_from_row(&row)]).await?;
                Ok(notes.pop())
            }
            None => Ok(None),
        }
    }

    async fn fetch_many(&self, ids: &[i64]) -> Result<Vec<Note>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(&format!(
            "SELECT {} FROM note n WHERE n.id = ANY($1) ORDER BY n.id",
            NOTE_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        self.with_labels(rows.iter().map(Self::note_from_row).collect())
            .await
    }

    async fn list(&self, owner_id: i64, filter: NoteFilter) -> Result<Vec<Note>> {
        let (predicate, order) = match filter {
            NoteFilter::Active => ("n.is_deleted = FALSE", ACTIVE_ORDER),
            NoteFilter::Archived => ("n.is_archived = TRUE AND n.is_deleted = FALSE", ACTIVE_ORDER),
            NoteFilter::Trashed => ("n.is_deleted = TRUE", TRASH_ORDER),
        };
        let sql = format!(
            "SELECT {} FROM note n WHERE n.owner_id = $1 AND {} ORDER BY {}",
            NOTE_COLUMNS, predicate, order
        );

        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        self.with_labels(rows.iter().map(Self::note_from_row).collect())
            .await
    }

    async fn list_with_label(&self, owner_id: i64, label_id: i64) -> Result<Vec<Note>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM note n
            JOIN note_label nl ON nl.note_id = n.id
            WHERE n.owner_id = $1 AND nl.label_id = $2 AND n.is_deleted = FALSE
            ORDER BY {}
            "#,
            NOTE_COLUMNS, ACTIVE_ORDER
        );

        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .bind(label_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        self.with_labels(rows.iter().map(Self::note_from_row).collect())
            .await
    }

    async fn search(&self, owner_id: i64, query: &str) -> Result<Vec<Note>> {
        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            r#"
            SELECT {}
            FROM note n
            WHERE n.owner_id = $1
              AND n.is_deleted = FALSE
              AND (n.title ILIKE $2 ESCAPE '\' OR n.content ILIKE $2 ESCAPE '\')
            ORDER BY {}
            "#,
            NOTE_COLUMNS, ACTIVE_ORDER
        );

        let rows = sqlx::query(&sql)
            .bind(owner_id)
            .bind(&pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        self.with_labels(rows.iter().map(Self::note_from_row).collect())
            .await
    }

    async fn insert(&self, note: NewNote) -> Result<Note> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO note (owner_id, title, content, color, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(note.owner_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.color)
        .bind(note.created_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        for label_id in &note.label_ids {
            sqlx::query(
                "INSERT INTO note_label (note_id, label_id, created_at) VALUES ($1, $2, $3)
                 ON CONFLICT (note_id, label_id) DO NOTHING",
            )
            .bind(id)
            .bind(label_id)
            .bind(note.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| association_error(e, id, *label_id))?;
        }

        tx.commit().await.map_err(Error::Database)?;

        self.fetch(id)
            .await?
            .ok_or_else(|| Error::Internal(format!("note {} vanished after insert", id)))
    }

    async fn save(&self, note: &Note) -> Result<()> {
        if Self::write_columns(&self.pool, note).await? == 0 {
            return Err(Error::NoteNotFound(note.id));
        }
        Ok(())
    }

    async fn save_with_labels(
        &self,
        note: &Note,
        label_ids: &[i64],
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        if Self::write_columns(&mut *tx, note).await? == 0 {
            return Err(Error::NoteNotFound(note.id));
        }

        // Existing pairs that stay keep their original created_at.
        sqlx::query("DELETE FROM note_label WHERE note_id = $1 AND NOT (label_id = ANY($2))")
            .bind(note.id)
            .bind(label_ids)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        for label_id in label_ids {
            sqlx::query(
                "INSERT INTO note_label (note_id, label_id, created_at) VALUES ($1, $2, $3)
                 ON CONFLICT (note_id, label_id) DO NOTHING",
            )
            .bind(note.id)
            .bind(label_id)
            .bind(at)
            .execute(&mut *tx)
            .await
            .map_err(|e| association_error(e, note.id, *label_id))?;
        }

        // Dropping `tx` on any error above rolls the column update back too.
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn attach_label(&self, note_id: i64, label_id: i64, at: DateTime<Utc>) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let inserted = sqlx::query(
            "INSERT INTO note_label (note_id, label_id, created_at) VALUES ($1, $2, $3)
             ON CONFLICT (note_id, label_id) DO NOTHING",
        )
        .bind(note_id)
        .bind(label_id)
        .bind(at)
        .execute(&mut *tx)
        .await
        .map_err(|e| association_error(e, note_id, label_id))?
        .rows_affected()
            > 0;

        if inserted {
            Self::bump_updated_at(&mut tx, note_id, at).await?;
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(inserted)
    }

    async fn detach_label(&self, note_id: i64, label_id: i64, at: DateTime<Utc>) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let removed = sqlx::query("DELETE FROM note_label WHERE note_id = $1 AND label_id = $2")
            .bind(note_id)
            .bind(label_id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?
            .rows_affected()
            > 0;

        if removed {
            Self::bump_updated_at(&mut tx, note_id, at).await?;
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(removed)
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM note WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_trashed(&self, owner_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM note WHERE owner_id = $1 AND is_deleted = TRUE")
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}
