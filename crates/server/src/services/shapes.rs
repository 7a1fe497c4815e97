//! Map shapes and their pipe-size history.

use tracing::{info, instrument};

use waterline_core::ShapeId;

use super::{AuditLog, ServiceError, non_empty, optional_text, require_map_editor};
use crate::models::{
    AppendPipeLogInput, AuditAction, MapShape, NewAuditEntry, NewPipeLog, PipeLog,
    RequestContext, ShapeInput,
};
use crate::store::{AuditSink, Store};

/// Map annotation management.
pub struct ShapeService<'a> {
    store: &'a dyn Store,
    audit: AuditLog<'a>,
}

impl<'a> ShapeService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, audit: &'a dyn AuditSink) -> Self {
        Self {
            store,
            audit: AuditLog::new(audit),
        }
    }

    /// Persist a newly drawn shape.
    ///
    /// The GeoJSON is stored as given; only its top level is checked.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` if the GeoJSON is not an object,
    /// the title is blank, or the radius is not a positive finite number.
    #[instrument(skip(self, input), fields(user_id = %ctx.user_id, kind = ?input.kind))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: ShapeInput,
    ) -> Result<MapShape, ServiceError> {
        require_map_editor(ctx)?;
        let input = validate(input)?;
        let shape = self.store.insert_shape(&input, ctx.user_id).await?;

        info!(id = %shape.id, "Shape created");
        self.audit
            .record(
                NewAuditEntry::new(ctx.user_id, AuditAction::Create, "shape")
                    .with_id(shape.id)
                    .with_detail(shape.title.clone()),
            )
            .await;
        Ok(shape)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the shape does not exist.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn get(&self, ctx: &RequestContext, id: ShapeId) -> Result<MapShape, ServiceError> {
        self.store
            .get_shape(id)
            .await?
            .ok_or(ServiceError::NotFound("shape"))
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on storage failure.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<MapShape>, ServiceError> {
        Ok(self.store.list_shapes().await?)
    }

    /// Replace a shape's geometry and metadata wholesale.
    ///
    /// `size` is left as stored; use [`Self::append_log`] to change it so the
    /// pipe log stays a complete history.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the shape does not exist, and the
    /// validation errors of [`Self::create`].
    #[instrument(skip(self, input), fields(user_id = %ctx.user_id))]
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: ShapeId,
        input: ShapeInput,
    ) -> Result<MapShape, ServiceError> {
        require_map_editor(ctx)?;
        let input = validate(input)?;
        let shape = self
            .store
            .update_shape(id, &input)
            .await?
            .ok_or(ServiceError::NotFound("shape"))?;

        self.audit
            .record(NewAuditEntry::new(ctx.user_id, AuditAction::Update, "shape").with_id(id))
            .await;
        Ok(shape)
    }

    /// Delete a shape together with its pipe logs.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the shape does not exist.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn delete(&self, ctx: &RequestContext, id: ShapeId) -> Result<(), ServiceError> {
        require_map_editor(ctx)?;
        if !self.store.delete_shape(id).await? {
            return Err(ServiceError::NotFound("shape"));
        }

        info!(%id, "Shape deleted");
        self.audit
            .record(NewAuditEntry::new(ctx.user_id, AuditAction::Delete, "shape").with_id(id))
            .await;
        Ok(())
    }

    /// Record a new pipe size: the shape's `size` is overwritten and one
    /// log row carrying that size is appended, in a single store call.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a blank size and
    /// `ServiceError::NotFound` if the shape does not exist.
    #[instrument(skip(self, input), fields(user_id = %ctx.user_id))]
    pub async fn append_log(
        &self,
        ctx: &RequestContext,
        shape_id: ShapeId,
        input: AppendPipeLogInput,
    ) -> Result<(MapShape, PipeLog), ServiceError> {
        require_map_editor(ctx)?;
        let log = NewPipeLog {
            size: non_empty(&input.size, "size")?,
            remarks: optional_text(input.remarks.as_deref()),
            logged_by: ctx.user_id,
        };

        let (shape, entry) = self
            .store
            .append_pipe_log(shape_id, &log)
            .await?
            .ok_or(ServiceError::NotFound("shape"))?;

        info!(%shape_id, log_id = %entry.id, size = %entry.size, "Pipe log appended");
        self.audit
            .record(
                NewAuditEntry::new(ctx.user_id, AuditAction::AppendLog, "shape")
                    .with_id(shape_id)
                    .with_detail(entry.size.clone()),
            )
            .await;
        Ok((shape, entry))
    }

    /// Pipe logs of a shape, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the shape does not exist.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn logs(
        &self,
        ctx: &RequestContext,
        shape_id: ShapeId,
    ) -> Result<Vec<PipeLog>, ServiceError> {
        self.get(ctx, shape_id).await?;
        Ok(self.store.list_pipe_logs(shape_id).await?)
    }
}

fn validate(mut input: ShapeInput) -> Result<ShapeInput, ServiceError> {
    if !input.geojson.is_object() {
        return Err(ServiceError::validation("geojson must be a JSON object"));
    }
    input.title = non_empty(&input.title, "title")?;
    if input
        .radius
        .is_some_and(|radius| !(radius.is_finite() && radius > 0.0))
    {
        return Err(ServiceError::validation("radius must be a positive number"));
    }
    input.description = optional_text(input.description.as_deref());
    input.size = optional_text(input.size.as_deref());
    if input.color.trim().is_empty() {
        input.color = crate::models::DEFAULT_SHAPE_COLOR.to_string();
    }
    Ok(input)
}
