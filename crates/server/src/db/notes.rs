//! Database operations for field notes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use waterline_core::{NoteId, UserId};

use super::{PgStore, RepositoryError};
use crate::models::{Note, NoteInput};
use crate::store::NoteStore;

const COLUMNS: &str = "id, title, body, latitude, longitude, created_by, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct NoteRow {
    id: i32,
    title: String,
    body: String,
    latitude: f64,
    longitude: f64,
    created_by: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Self {
            id: NoteId::new(row.id),
            title: row.title,
            body: row.body,
            latitude: row.latitude,
            longitude: row.longitude,
            created_by: row.created_by.map(UserId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl NoteStore for PgStore {
    async fn insert_note(
        &self,
        input: &NoteInput,
        created_by: UserId,
    ) -> Result<Note, RepositoryError> {
        let row = sqlx::query_as::<_, NoteRow>(&format!(
            "INSERT INTO waterline.note (title, body, latitude, longitude, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        ))
        .bind(&input.title)
        .bind(&input.body)
        .bind(input.latitude)
        .bind(input.longitude)
        .bind(created_by)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_write(e, "author does not exist"))?;

        Ok(row.into())
    }

    async fn get_note(&self, id: NoteId) -> Result<Option<Note>, RepositoryError> {
        let row = sqlx::query_as::<_, NoteRow>(&format!(
            "SELECT {COLUMNS} FROM waterline.note WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_notes(&self) -> Result<Vec<Note>, RepositoryError> {
        let rows = sqlx::query_as::<_, NoteRow>(&format!(
            "SELECT {COLUMNS} FROM waterline.note ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_note(
        &self,
        id: NoteId,
        input: &NoteInput,
    ) -> Result<Option<Note>, RepositoryError> {
        let row = sqlx::query_as::<_, NoteRow>(&format!(
            "UPDATE waterline.note
             SET title = $2, body = $3, latitude = $4, longitude = $5, updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.body)
        .bind(input.latitude)
        .bind(input.longitude)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_note(&self, id: NoteId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM waterline.note WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
