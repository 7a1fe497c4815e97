//! Storage seams.
//!
//! Services talk to persistence only through these traits. [`crate::db::PgStore`]
//! implements them against `PostgreSQL`; [`memory::InMemoryStore`] implements
//! them in process for tests and local experiments.
//!
//! Stores take and return plain model values. Validation, permission checks
//! and audit logging belong to the services; stores only guarantee the
//! atomicity documented on each method.

pub mod memory;

use async_trait::async_trait;

use waterline_core::{
    CatalogEntryId, CatalogKind, ConversationId, InventoryId, NoteId, SaleId, ShapeId, UserId,
    Username,
};

use crate::db::RepositoryError;
use crate::models::{
    AuditEntry, CatalogEntry, Conversation, CreateInventoryInput, InventoryFilter,
    InventoryRecord, MapShape, Message, NewAuditEntry, NewCatalogEntry, NewMessage, NewPipeLog,
    NewSale, NewUser, Note, NoteInput, PipeLog, RestockInput, Sale, SaleFilter, SaleOutcome,
    ShapeInput, User, UserCredentials,
};

/// Liveness of the backing store.
#[async_trait]
pub trait HealthStore: Send + Sync {
    /// Round-trip to the store.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

/// Catalog entries.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert_catalog_entry(
        &self,
        entry: &NewCatalogEntry,
    ) -> Result<CatalogEntry, RepositoryError>;

    async fn get_catalog_entry(
        &self,
        id: CatalogEntryId,
    ) -> Result<Option<CatalogEntry>, RepositoryError>;

    /// Entries of one kind ordered by name, optionally restricted to a parent.
    async fn list_catalog_entries(
        &self,
        kind: CatalogKind,
        parent_id: Option<CatalogEntryId>,
    ) -> Result<Vec<CatalogEntry>, RepositoryError>;

    /// Replace name, description and parent. `None` if the id does not exist.
    async fn update_catalog_entry(
        &self,
        id: CatalogEntryId,
        entry: &NewCatalogEntry,
    ) -> Result<Option<CatalogEntry>, RepositoryError>;

    /// Returns `false` if nothing was deleted.
    ///
    /// # Errors
    ///
    /// `RepositoryError::Conflict` if a child entry, inventory record or sale
    /// still references the entry.
    async fn delete_catalog_entry(&self, id: CatalogEntryId) -> Result<bool, RepositoryError>;
}

/// Inventory records.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn insert_inventory(
        &self,
        input: &CreateInventoryInput,
    ) -> Result<InventoryRecord, RepositoryError>;

    async fn get_inventory(
        &self,
        id: InventoryId,
    ) -> Result<Option<InventoryRecord>, RepositoryError>;

    async fn list_inventory(
        &self,
        filter: &InventoryFilter,
    ) -> Result<Vec<InventoryRecord>, RepositoryError>;

    /// Add `input.quantity` to the stored quantity and replace price and
    /// supplier, in a single statement. `None` if the id does not exist.
    async fn restock_inventory(
        &self,
        id: InventoryId,
        input: &RestockInput,
    ) -> Result<Option<InventoryRecord>, RepositoryError>;

    /// # Errors
    ///
    /// `RepositoryError::Conflict` if sales reference the record.
    async fn delete_inventory(&self, id: InventoryId) -> Result<bool, RepositoryError>;
}

/// Sales.
#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Check stock, decrement it and insert the sale as one atomic unit.
    ///
    /// Profit is computed from the inventory price read under the same lock.
    async fn record_sale(&self, sale: &NewSale) -> Result<SaleOutcome, RepositoryError>;

    async fn get_sale(&self, id: SaleId) -> Result<Option<Sale>, RepositoryError>;

    /// Newest first.
    async fn list_sales(&self, filter: &SaleFilter) -> Result<Vec<Sale>, RepositoryError>;
}

/// Map shapes and their pipe logs.
#[async_trait]
pub trait ShapeStore: Send + Sync {
    async fn insert_shape(
        &self,
        input: &ShapeInput,
        created_by: UserId,
    ) -> Result<MapShape, RepositoryError>;

    async fn get_shape(&self, id: ShapeId) -> Result<Option<MapShape>, RepositoryError>;

    /// Oldest first.
    async fn list_shapes(&self) -> Result<Vec<MapShape>, RepositoryError>;

    /// Overwrite geometry and metadata, keeping the current `size`.
    /// `None` if the id does not exist.
    async fn update_shape(
        &self,
        id: ShapeId,
        input: &ShapeInput,
    ) -> Result<Option<MapShape>, RepositoryError>;

    /// Delete the shape and, with it, its pipe logs.
    async fn delete_shape(&self, id: ShapeId) -> Result<bool, RepositoryError>;

    /// Set the shape's size and append a log row carrying it, atomically.
    ///
    /// The new row's `created_at` is never earlier than any existing row for
    /// the shape. `None` if the shape does not exist.
    async fn append_pipe_log(
        &self,
        shape_id: ShapeId,
        log: &NewPipeLog,
    ) -> Result<Option<(MapShape, PipeLog)>, RepositoryError>;

    /// Oldest first.
    async fn list_pipe_logs(&self, shape_id: ShapeId) -> Result<Vec<PipeLog>, RepositoryError>;
}

/// Field notes.
#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn insert_note(&self, input: &NoteInput, created_by: UserId)
    -> Result<Note, RepositoryError>;

    async fn get_note(&self, id: NoteId) -> Result<Option<Note>, RepositoryError>;

    /// Newest first.
    async fn list_notes(&self) -> Result<Vec<Note>, RepositoryError>;

    async fn update_note(
        &self,
        id: NoteId,
        input: &NoteInput,
    ) -> Result<Option<Note>, RepositoryError>;

    async fn delete_note(&self, id: NoteId) -> Result<bool, RepositoryError>;
}

/// User accounts.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// # Errors
    ///
    /// `RepositoryError::Conflict` if the username is taken.
    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<UserCredentials>, RepositoryError>;

    /// Ordered by username.
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;

    /// Deleting a user removes their conversations; authored rows keep a
    /// null author.
    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError>;
}

/// Conversations and messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Return the conversation for the (unordered) pair, creating it if needed.
    async fn find_or_create_conversation(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Conversation, RepositoryError>;

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError>;

    /// Conversations the user takes part in, newest first.
    async fn list_conversations_for(
        &self,
        user: UserId,
    ) -> Result<Vec<Conversation>, RepositoryError>;

    async fn insert_message(&self, message: &NewMessage) -> Result<Message, RepositoryError>;

    /// Oldest first.
    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError>;
}

/// Reading the audit trail.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Newest first, at most `limit` entries.
    async fn list_audit_entries(&self, limit: i64) -> Result<Vec<AuditEntry>, RepositoryError>;
}

/// Appending to the audit trail.
///
/// Kept separate from [`Store`] so the audit side channel can be swapped or
/// fail independently of the primary store.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn append_audit_entry(&self, entry: &NewAuditEntry) -> Result<(), RepositoryError>;
}

/// Everything the services need from primary storage.
pub trait Store:
    HealthStore
    + CatalogStore
    + InventoryStore
    + SaleStore
    + ShapeStore
    + NoteStore
    + UserStore
    + MessageStore
    + AuditStore
{
}

impl<T> Store for T where
    T: HealthStore
        + CatalogStore
        + InventoryStore
        + SaleStore
        + ShapeStore
        + NoteStore
        + UserStore
        + MessageStore
        + AuditStore
{
}
