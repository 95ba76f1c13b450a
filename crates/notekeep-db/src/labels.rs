//! Label repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use notekeep_core::{Error, Label, LabelRepository, NewLabel, Result};

/// PostgreSQL implementation of LabelRepository.
pub struct PgLabelRepository {
    pool: Pool<Postgres>,
}

impl PgLabelRepository {
    /// Create a new PgLabelRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn label_from_row(row: &PgRow) -> Label {
        Label {
            id: row.get("id"),
            owner_id: row.get("owner_id"),
            name: row.get("name"),
            created_at: row.get("created_at"),
        }
    }
}

/// The unique index on `(owner_id, LOWER(name))` backs the service-level check.
fn name_conflict(e: sqlx::Error) -> Error {
    let duplicate = e
        .as_database_error()
        .map(|d| d.is_unique_violation())
        .unwrap_or(false);
    if duplicate {
        Error::Validation("A label with this name already exists".to_string())
    } else {
        Error::Database(e)
    }
}

#[async_trait]
impl LabelRepository for PgLabelRepository {
    async fn fetch(&self, id: i64) -> Result<Option<Label>> {
        let row = sqlx::query("SELECT id, owner_id, name, created_at FROM label WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(Self::label_from_row))
    }

    async fn fetch_for_owner(&self, owner_id: i64, ids: &[i64]) -> Result<Vec<Label>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(
            "SELECT id, owner_id, name, created_at FROM label
             WHERE owner_id = $1 AND id = ANY($2)",
        )
        .bind(owner_id)
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(Self::label_from_row).collect())
    }

    async fn list(&self, owner_id: i64) -> Result<Vec<Label>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, name, created_at FROM label
             WHERE owner_id = $1
             ORDER BY LOWER(name), id",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(Self::label_from_row).collect())
    }

    async fn exists_for_owner(
        &self,
        name: &str,
        owner_id: i64,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM label
                WHERE owner_id = $1
                  AND LOWER(name) = LOWER($2)
                  AND ($3::BIGINT IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(exists)
    }

    async fn insert(&self, label: NewLabel) -> Result<Label> {
        let row = sqlx::query(
            r#"
            INSERT INTO label (owner_id, name, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, owner_id, name, created_at
            "#,
        )
        .bind(label.owner_id)
        .bind(&label.name)
        .bind(label.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(name_conflict)?;
        Ok(Self::label_from_row(&row))
    }

    async fn rename(&self, id: i64, name: &str) -> Result<()> {
        let result = sqlx::query("UPDATE label SET name = $2 WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(name_conflict)?;

        if result.rows_affected() == 0 {
            return Err(Error::LabelNotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM label WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}
