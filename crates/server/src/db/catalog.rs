//! Database operations for catalog entries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use waterline_core::{CatalogEntryId, CatalogKind};

use super::{PgStore, RepositoryError};
use crate::models::{CatalogEntry, NewCatalogEntry};
use crate::store::CatalogStore;

const COLUMNS: &str = "id, kind, name, description, parent_id, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct CatalogEntryRow {
    id: i32,
    kind: CatalogKind,
    name: String,
    description: Option<String>,
    parent_id: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CatalogEntryRow> for CatalogEntry {
    fn from(row: CatalogEntryRow) -> Self {
        Self {
            id: CatalogEntryId::new(row.id),
            kind: row.kind,
            name: row.name,
            description: row.description,
            parent_id: row.parent_id.map(CatalogEntryId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn insert_catalog_entry(
        &self,
        entry: &NewCatalogEntry,
    ) -> Result<CatalogEntry, RepositoryError> {
        let row = sqlx::query_as::<_, CatalogEntryRow>(&format!(
            "INSERT INTO waterline.catalog_entry (kind, name, description, parent_id)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(entry.kind)
        .bind(&entry.name)
        .bind(&entry.description)
        .bind(entry.parent_id)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_write(e, "parent does not exist"))?;

        Ok(row.into())
    }

    async fn get_catalog_entry(
        &self,
        id: CatalogEntryId,
    ) -> Result<Option<CatalogEntry>, RepositoryError> {
        let row = sqlx::query_as::<_, CatalogEntryRow>(&format!(
            "SELECT {COLUMNS} FROM waterline.catalog_entry WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_catalog_entries(
        &self,
        kind: CatalogKind,
        parent_id: Option<CatalogEntryId>,
    ) -> Result<Vec<CatalogEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, CatalogEntryRow>(&format!(
            "SELECT {COLUMNS} FROM waterline.catalog_entry
             WHERE kind = $1 AND ($2::INTEGER IS NULL OR parent_id = $2)
             ORDER BY name, id"
        ))
        .bind(kind)
        .bind(parent_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_catalog_entry(
        &self,
        id: CatalogEntryId,
        entry: &NewCatalogEntry,
    ) -> Result<Option<CatalogEntry>, RepositoryError> {
        let row = sqlx::query_as::<_, CatalogEntryRow>(&format!(
            "UPDATE waterline.catalog_entry
             SET name = $2, description = $3, parent_id = $4, updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&entry.name)
        .bind(&entry.description)
        .bind(entry.parent_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| RepositoryError::from_write(e, "parent does not exist"))?;

        Ok(row.map(Into::into))
    }

    async fn delete_catalog_entry(&self, id: CatalogEntryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM waterline.catalog_entry WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| RepositoryError::from_write(e, "catalog entry is still referenced"))?;

        Ok(result.rows_affected() > 0)
    }
}
