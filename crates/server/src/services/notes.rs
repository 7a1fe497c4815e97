//! Field notes pinned to map locations.

use tracing::{info, instrument};

use waterline_core::NoteId;

use super::{AuditLog, ServiceError, non_empty, require_map_editor};
use crate::models::{AuditAction, NewAuditEntry, Note, NoteInput, RequestContext};
use crate::store::{AuditSink, Store};

pub struct NoteService<'a> {
    store: &'a dyn Store,
    audit: AuditLog<'a>,
}

impl<'a> NoteService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, audit: &'a dyn AuditSink) -> Self {
        Self {
            store,
            audit: AuditLog::new(audit),
        }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank title or coordinates
    /// outside the valid latitude/longitude ranges.
    #[instrument(skip(self, input), fields(user_id = %ctx.user_id))]
    pub async fn create(&self, ctx: &RequestContext, input: NoteInput) -> Result<Note, ServiceError> {
        require_map_editor(ctx)?;
        let input = validate(input)?;
        let note = self.store.insert_note(&input, ctx.user_id).await?;

        info!(id = %note.id, "Note created");
        self.audit
            .record(NewAuditEntry::new(ctx.user_id, AuditAction::Create, "note").with_id(note.id))
            .await;
        Ok(note)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the note does not exist.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn get(&self, ctx: &RequestContext, id: NoteId) -> Result<Note, ServiceError> {
        self.store
            .get_note(id)
            .await?
            .ok_or(ServiceError::NotFound("note"))
    }

    /// Newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on storage failure.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<Note>, ServiceError> {
        Ok(self.store.list_notes().await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the note does not exist, and the
    /// validation errors of [`Self::create`].
    #[instrument(skip(self, input), fields(user_id = %ctx.user_id))]
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: NoteId,
        input: NoteInput,
    ) -> Result<Note, ServiceError> {
        require_map_editor(ctx)?;
        let input = validate(input)?;
        let note = self
            .store
            .update_note(id, &input)
            .await?
            .ok_or(ServiceError::NotFound("note"))?;

        self.audit
            .record(NewAuditEntry::new(ctx.user_id, AuditAction::Update, "note").with_id(id))
            .await;
        Ok(note)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the note does not exist.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn delete(&self, ctx: &RequestContext, id: NoteId) -> Result<(), ServiceError> {
        require_map_editor(ctx)?;
        if !self.store.delete_note(id).await? {
            return Err(ServiceError::NotFound("note"));
        }

        self.audit
            .record(NewAuditEntry::new(ctx.user_id, AuditAction::Delete, "note").with_id(id))
            .await;
        Ok(())
    }
}

fn validate(mut input: NoteInput) -> Result<NoteInput, ServiceError> {
    input.title = non_empty(&input.title, "title")?;
    input.body = input.body.trim().to_string();
    if !(-90.0..=90.0).contains(&input.latitude) {
        return Err(ServiceError::validation("latitude must be within [-90, 90]"));
    }
    if !(-180.0..=180.0).contains(&input.longitude) {
        return Err(ServiceError::validation(
            "longitude must be within [-180, 180]",
        ));
    }
    Ok(input)
}
