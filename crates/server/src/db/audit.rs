//! Database operations for the audit log.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use waterline_core::{AuditEntryId, UserId};

use super::{PgStore, RepositoryError};
use crate::models::{AuditAction, AuditEntry, NewAuditEntry};
use crate::store::{AuditSink, AuditStore};

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: i32,
    user_id: Option<i32>,
    action: String,
    entity: String,
    entity_id: Option<i32>,
    detail: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditEntry {
    type Error = RepositoryError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let action: AuditAction = row
            .action
            .parse()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: AuditEntryId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            action,
            entity: row.entity,
            entity_id: row.entity_id,
            detail: row.detail,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl AuditStore for PgStore {
    async fn list_audit_entries(&self, limit: i64) -> Result<Vec<AuditEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, AuditRow>(
            "SELECT id, user_id, action, entity, entity_id, detail, created_at
             FROM waterline.audit_log
             ORDER BY created_at DESC, id DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[async_trait]
impl AuditSink for PgStore {
    async fn append_audit_entry(&self, entry: &NewAuditEntry) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO waterline.audit_log (user_id, action, entity, entity_id, detail)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(entry.user_id)
        .bind(entry.action.as_str())
        .bind(&entry.entity)
        .bind(entry.entity_id)
        .bind(&entry.detail)
        .execute(self.pool())
        .await?;

        Ok(())
    }
}
