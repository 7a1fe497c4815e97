//! Best-effort audit trail.

use tracing::{instrument, warn};

use super::{ServiceError, require_admin};
use crate::models::{AuditEntry, NewAuditEntry, RequestContext};
use crate::store::{AuditSink, Store};

/// Default number of entries returned by [`AuditService::recent`].
pub const DEFAULT_AUDIT_LIMIT: i64 = 100;
/// Upper bound on [`AuditService::recent`].
pub const MAX_AUDIT_LIMIT: i64 = 1000;

/// Audit writer.
///
/// Writes never fail the caller: the entry is appended after the primary
/// write has succeeded and any error is logged and dropped.
pub struct AuditLog<'a> {
    sink: &'a dyn AuditSink,
}

impl<'a> AuditLog<'a> {
    /// Create an audit writer over `sink`.
    #[must_use]
    pub const fn new(sink: &'a dyn AuditSink) -> Self {
        Self { sink }
    }

    /// Append an entry, swallowing failures.
    pub async fn record(&self, entry: NewAuditEntry) {
        if let Err(e) = self.sink.append_audit_entry(&entry).await {
            warn!(
                error = %e,
                action = %entry.action,
                entity = %entry.entity,
                entity_id = ?entry.entity_id,
                "Failed to write audit entry"
            );
        }
    }
}

/// Read access to the audit trail.
pub struct AuditService<'a> {
    store: &'a dyn Store,
}

impl<'a> AuditService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// List recent audit entries, newest first. Admin only.
    ///
    /// `limit` defaults to [`DEFAULT_AUDIT_LIMIT`] and is clamped to
    /// `1..=MAX_AUDIT_LIMIT`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for non-admins.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn recent(
        &self,
        ctx: &RequestContext,
        limit: Option<i64>,
    ) -> Result<Vec<AuditEntry>, ServiceError> {
        require_admin(ctx)?;
        let limit = limit
            .unwrap_or(DEFAULT_AUDIT_LIMIT)
            .clamp(1, MAX_AUDIT_LIMIT);
        Ok(self.store.list_audit_entries(limit).await?)
    }
}
