//! Catalog of sources, barangays, puroks, sheets, categories, suppliers
//! and items.

use tracing::{info, instrument};

use waterline_core::{CatalogEntryId, CatalogKind};

use super::{AuditLog, ServiceError, non_empty, optional_text, require_admin};
use crate::models::{
    AuditAction, CatalogEntry, CatalogInput, NewAuditEntry, NewCatalogEntry, RequestContext,
};
use crate::store::{AuditSink, Store};

/// Catalog management.
pub struct CatalogService<'a> {
    store: &'a dyn Store,
    audit: AuditLog<'a>,
}

impl<'a> CatalogService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, audit: &'a dyn AuditSink) -> Self {
        Self {
            store,
            audit: AuditLog::new(audit),
        }
    }

    /// Create an entry of `kind`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank name or a parent that
    /// is missing when required, present when not allowed, or of the wrong
    /// kind.
    #[instrument(skip(self, input), fields(user_id = %ctx.user_id))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        kind: CatalogKind,
        input: CatalogInput,
    ) -> Result<CatalogEntry, ServiceError> {
        require_admin(ctx)?;
        let entry = self.validate(kind, &input).await?;
        let created = self.store.insert_catalog_entry(&entry).await?;

        info!(id = %created.id, "Catalog entry created");
        self.audit
            .record(
                NewAuditEntry::new(ctx.user_id, AuditAction::Create, kind.as_str())
                    .with_id(created.id)
                    .with_detail(created.name.clone()),
            )
            .await;
        Ok(created)
    }

    /// Fetch an entry, checking that it is of `kind`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no entry of that kind has the id.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn get(
        &self,
        ctx: &RequestContext,
        kind: CatalogKind,
        id: CatalogEntryId,
    ) -> Result<CatalogEntry, ServiceError> {
        self.store
            .get_catalog_entry(id)
            .await?
            .filter(|entry| entry.kind == kind)
            .ok_or(ServiceError::NotFound("catalog entry"))
    }

    /// List entries of `kind`, optionally under one parent.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on storage failure.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn list(
        &self,
        ctx: &RequestContext,
        kind: CatalogKind,
        parent_id: Option<CatalogEntryId>,
    ) -> Result<Vec<CatalogEntry>, ServiceError> {
        Ok(self.store.list_catalog_entries(kind, parent_id).await?)
    }

    /// Replace name, description and parent.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no entry of `kind` has the id, and
    /// the validation errors of [`Self::create`].
    #[instrument(skip(self, input), fields(user_id = %ctx.user_id))]
    pub async fn update(
        &self,
        ctx: &RequestContext,
        kind: CatalogKind,
        id: CatalogEntryId,
        input: CatalogInput,
    ) -> Result<CatalogEntry, ServiceError> {
        require_admin(ctx)?;
        let entry = self.validate(kind, &input).await?;
        self.get(ctx, kind, id).await?;

        let updated = self
            .store
            .update_catalog_entry(id, &entry)
            .await?
            .ok_or(ServiceError::NotFound("catalog entry"))?;

        self.audit
            .record(NewAuditEntry::new(ctx.user_id, AuditAction::Update, kind.as_str()).with_id(id))
            .await;
        Ok(updated)
    }

    /// Delete an entry.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if no entry of `kind` has the id and
    /// `ServiceError::Conflict` if anything still references it.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        kind: CatalogKind,
        id: CatalogEntryId,
    ) -> Result<(), ServiceError> {
        require_admin(ctx)?;
        self.get(ctx, kind, id).await?;

        if !self.store.delete_catalog_entry(id).await? {
            return Err(ServiceError::NotFound("catalog entry"));
        }

        info!(%id, "Catalog entry deleted");
        self.audit
            .record(NewAuditEntry::new(ctx.user_id, AuditAction::Delete, kind.as_str()).with_id(id))
            .await;
        Ok(())
    }

    async fn validate(
        &self,
        kind: CatalogKind,
        input: &CatalogInput,
    ) -> Result<NewCatalogEntry, ServiceError> {
        let name = non_empty(&input.name, "name")?;

        match (kind.parent_kind(), input.parent_id) {
            (None, Some(_)) => {
                return Err(ServiceError::validation(format!("a {kind} has no parent")));
            }
            (Some(parent_kind), None) => {
                return Err(ServiceError::validation(format!(
                    "a {kind} must belong to a {parent_kind}"
                )));
            }
            (Some(parent_kind), Some(parent_id)) => {
                let parent = self.store.get_catalog_entry(parent_id).await?;
                if parent.is_none_or(|p| p.kind != parent_kind) {
                    return Err(ServiceError::validation(format!(
                        "parent {parent_id} is not a {parent_kind}"
                    )));
                }
            }
            (None, None) => {}
        }

        Ok(NewCatalogEntry {
            kind,
            name,
            description: optional_text(input.description.as_deref()),
            parent_id: input.parent_id,
        })
    }
}
