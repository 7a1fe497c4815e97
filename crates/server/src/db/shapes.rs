//! Database operations for map shapes and pipe logs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use waterline_core::{PipeLogId, ShapeId, ShapeKind, ShapeStatus, UserId};

use super::{PgStore, RepositoryError};
use crate::models::{MapShape, NewPipeLog, PipeLog, ShapeInput};
use crate::store::ShapeStore;

const SHAPE_COLUMNS: &str = "id, kind, geojson, radius, title, description, status, color, size, \
                             created_by, created_at, updated_at";
const LOG_COLUMNS: &str = "id, shape_id, size, remarks, logged_by, created_at";

#[derive(Debug, sqlx::FromRow)]
struct MapShapeRow {
    id: i32,
    kind: ShapeKind,
    geojson: serde_json::Value,
    radius: Option<f64>,
    title: String,
    description: Option<String>,
    status: ShapeStatus,
    color: String,
    size: Option<String>,
    created_by: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MapShapeRow> for MapShape {
    fn from(row: MapShapeRow) -> Self {
        Self {
            id: ShapeId::new(row.id),
            kind: row.kind,
            geojson: row.geojson,
            radius: row.radius,
            title: row.title,
            description: row.description,
            status: row.status,
            color: row.color,
            size: row.size,
            created_by: row.created_by.map(UserId::new),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PipeLogRow {
    id: i32,
    shape_id: i32,
    size: String,
    remarks: Option<String>,
    logged_by: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<PipeLogRow> for PipeLog {
    fn from(row: PipeLogRow) -> Self {
        Self {
            id: PipeLogId::new(row.id),
            shape_id: ShapeId::new(row.shape_id),
            size: row.size,
            remarks: row.remarks,
            logged_by: row.logged_by.map(UserId::new),
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl ShapeStore for PgStore {
    async fn insert_shape(
        &self,
        input: &ShapeInput,
        created_by: UserId,
    ) -> Result<MapShape, RepositoryError> {
        let row = sqlx::query_as::<_, MapShapeRow>(&format!(
            "INSERT INTO waterline.map_shape
                (kind, geojson, radius, title, description, status, color, size, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {SHAPE_COLUMNS}"
        ))
        .bind(input.kind)
        .bind(&input.geojson)
        .bind(input.radius)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.status)
        .bind(&input.color)
        .bind(&input.size)
        .bind(created_by)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_write(e, "author does not exist"))?;

        Ok(row.into())
    }

    async fn get_shape(&self, id: ShapeId) -> Result<Option<MapShape>, RepositoryError> {
        let row = sqlx::query_as::<_, MapShapeRow>(&format!(
            "SELECT {SHAPE_COLUMNS} FROM waterline.map_shape WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_shapes(&self) -> Result<Vec<MapShape>, RepositoryError> {
        let rows = sqlx::query_as::<_, MapShapeRow>(&format!(
            "SELECT {SHAPE_COLUMNS} FROM waterline.map_shape ORDER BY created_at, id"
        ))
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_shape(
        &self,
        id: ShapeId,
        input: &ShapeInput,
    ) -> Result<Option<MapShape>, RepositoryError> {
        let row = sqlx::query_as::<_, MapShapeRow>(&format!(
            "UPDATE waterline.map_shape
             SET kind = $2, geojson = $3, radius = $4, title = $5, description = $6,
                 status = $7, color = $8, updated_at = now()
             WHERE id = $1
             RETURNING {SHAPE_COLUMNS}"
        ))
        .bind(id)
        .bind(input.kind)
        .bind(&input.geojson)
        .bind(input.radius)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.status)
        .bind(&input.color)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete_shape(&self, id: ShapeId) -> Result<bool, RepositoryError> {
        // pipe_log rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM waterline.map_shape WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn append_pipe_log(
        &self,
        shape_id: ShapeId,
        log: &NewPipeLog,
    ) -> Result<Option<(MapShape, PipeLog)>, RepositoryError> {
        let mut tx = self.pool().begin().await?;

        let shape = sqlx::query_as::<_, MapShapeRow>(&format!(
            "UPDATE waterline.map_shape
             SET size = $2, updated_at = now()
             WHERE id = $1
             RETURNING {SHAPE_COLUMNS}"
        ))
        .bind(shape_id)
        .bind(&log.size)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(shape) = shape else {
            return Ok(None);
        };

        // The shape row lock taken above serialises appends for this shape,
        // so the max() below cannot race another insert.
        let entry = sqlx::query_as::<_, PipeLogRow>(&format!(
            "INSERT INTO waterline.pipe_log (shape_id, size, remarks, logged_by, created_at)
             SELECT $1, $2, $3, $4, GREATEST(clock_timestamp(), COALESCE(MAX(created_at), '-infinity'))
             FROM waterline.pipe_log WHERE shape_id = $1
             RETURNING {LOG_COLUMNS}"
        ))
        .bind(shape_id)
        .bind(&log.size)
        .bind(&log.remarks)
        .bind(log.logged_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "author does not exist"))?;

        tx.commit().await?;

        Ok(Some((shape.into(), entry.into())))
    }

    async fn list_pipe_logs(&self, shape_id: ShapeId) -> Result<Vec<PipeLog>, RepositoryError> {
        let rows = sqlx::query_as::<_, PipeLogRow>(&format!(
            "SELECT {LOG_COLUMNS} FROM waterline.pipe_log
             WHERE shape_id = $1
             ORDER BY created_at, id"
        ))
        .bind(shape_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
