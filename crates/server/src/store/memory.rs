//! In-process store.
//!
//! Every operation takes one lock over all tables, so each call is atomic
//! with respect to every other call. Referential rules mirror the
//! `PostgreSQL` schema: writes that would dangle a reference or remove a
//! referenced row fail with `RepositoryError::Conflict`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use waterline_core::{
    AuditEntryId, CatalogEntryId, CatalogKind, ConversationId, InventoryId, MessageId, NoteId,
    PipeLogId, SaleId, ShapeId, UserId, Username,
};

use super::{
    AuditSink, AuditStore, CatalogStore, HealthStore, InventoryStore, MessageStore, NoteStore,
    SaleStore, ShapeStore, UserStore,
};
use crate::db::RepositoryError;
use crate::models::{
    AuditEntry, CatalogEntry, Conversation, CreateInventoryInput, InventoryFilter,
    InventoryRecord, MapShape, Message, NewAuditEntry, NewCatalogEntry, NewMessage, NewPipeLog,
    NewSale, NewUser, Note, NoteInput, PipeLog, RestockInput, Sale, SaleFilter, SaleOutcome,
    ShapeInput, User, UserCredentials, compute_profit,
};

#[derive(Debug, Default)]
struct Tables {
    last_id: i32,
    users: BTreeMap<i32, UserCredentials>,
    catalog: BTreeMap<i32, CatalogEntry>,
    inventory: BTreeMap<i32, InventoryRecord>,
    sales: BTreeMap<i32, Sale>,
    shapes: BTreeMap<i32, MapShape>,
    pipe_logs: BTreeMap<i32, PipeLog>,
    notes: BTreeMap<i32, Note>,
    conversations: BTreeMap<i32, Conversation>,
    messages: BTreeMap<i32, Message>,
    audit: BTreeMap<i32, AuditEntry>,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn catalog_kind(&self, id: CatalogEntryId) -> Option<CatalogKind> {
        self.catalog.get(&id.as_i32()).map(|entry| entry.kind)
    }

    fn catalog_referenced(&self, id: CatalogEntryId) -> bool {
        self.catalog.values().any(|e| e.parent_id == Some(id))
            || self
                .inventory
                .values()
                .any(|r| r.item_id == id || r.supplier_id == id)
            || self.sales.values().any(|s| s.item_id == id)
    }
}

/// Store that keeps everything in memory.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(mut rows: Vec<T>, key: impl Fn(&T) -> (DateTime<Utc>, i32)) -> Vec<T> {
    rows.sort_by_key(|row| std::cmp::Reverse(key(row)));
    rows
}

#[async_trait]
impl HealthStore for InMemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn insert_catalog_entry(
        &self,
        entry: &NewCatalogEntry,
    ) -> Result<CatalogEntry, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if entry
            .parent_id
            .is_some_and(|parent| tables.catalog_kind(parent).is_none())
        {
            return Err(RepositoryError::Conflict("parent does not exist".into()));
        }
        let now = Utc::now();
        let id = tables.next_id();
        let created = CatalogEntry {
            id: CatalogEntryId::new(id),
            kind: entry.kind,
            name: entry.name.clone(),
            description: entry.description.clone(),
            parent_id: entry.parent_id,
            created_at: now,
            updated_at: now,
        };
        tables.catalog.insert(id, created.clone());
        Ok(created)
    }

    async fn get_catalog_entry(
        &self,
        id: CatalogEntryId,
    ) -> Result<Option<CatalogEntry>, RepositoryError> {
        Ok(self.tables.lock().await.catalog.get(&id.as_i32()).cloned())
    }

    async fn list_catalog_entries(
        &self,
        kind: CatalogKind,
        parent_id: Option<CatalogEntryId>,
    ) -> Result<Vec<CatalogEntry>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut entries: Vec<CatalogEntry> = tables
            .catalog
            .values()
            .filter(|e| e.kind == kind)
            .filter(|e| parent_id.is_none_or(|p| e.parent_id == Some(p)))
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.as_i32().cmp(&b.id.as_i32())));
        Ok(entries)
    }

    async fn update_catalog_entry(
        &self,
        id: CatalogEntryId,
        entry: &NewCatalogEntry,
    ) -> Result<Option<CatalogEntry>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if entry
            .parent_id
            .is_some_and(|parent| tables.catalog_kind(parent).is_none())
        {
            return Err(RepositoryError::Conflict("parent does not exist".into()));
        }
        let Some(existing) = tables.catalog.get_mut(&id.as_i32()) else {
            return Ok(None);
        };
        existing.name.clone_from(&entry.name);
        existing.description.clone_from(&entry.description);
        existing.parent_id = entry.parent_id;
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }

    async fn delete_catalog_entry(&self, id: CatalogEntryId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.catalog.contains_key(&id.as_i32()) {
            return Ok(false);
        }
        if tables.catalog_referenced(id) {
            return Err(RepositoryError::Conflict(
                "catalog entry is still referenced".into(),
            ));
        }
        Ok(tables.catalog.remove(&id.as_i32()).is_some())
    }
}

#[async_trait]
impl InventoryStore for InMemoryStore {
    async fn insert_inventory(
        &self,
        input: &CreateInventoryInput,
    ) -> Result<InventoryRecord, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.catalog_kind(input.item_id).is_none()
            || tables.catalog_kind(input.supplier_id).is_none()
        {
            return Err(RepositoryError::Conflict(
                "item or supplier does not exist".into(),
            ));
        }
        let now = Utc::now();
        let id = tables.next_id();
        let record = InventoryRecord {
            id: InventoryId::new(id),
            item_id: input.item_id,
            supplier_id: input.supplier_id,
            quantity: input.quantity,
            price: input.price,
            created_at: now,
            updated_at: now,
        };
        tables.inventory.insert(id, record.clone());
        Ok(record)
    }

    async fn get_inventory(
        &self,
        id: InventoryId,
    ) -> Result<Option<InventoryRecord>, RepositoryError> {
        Ok(self.tables.lock().await.inventory.get(&id.as_i32()).cloned())
    }

    async fn list_inventory(
        &self,
        filter: &InventoryFilter,
    ) -> Result<Vec<InventoryRecord>, RepositoryError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .inventory
            .values()
            .filter(|r| filter.item_id.is_none_or(|id| r.item_id == id))
            .filter(|r| filter.supplier_id.is_none_or(|id| r.supplier_id == id))
            .cloned()
            .collect())
    }

    async fn restock_inventory(
        &self,
        id: InventoryId,
        input: &RestockInput,
    ) -> Result<Option<InventoryRecord>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.inventory.contains_key(&id.as_i32()) {
            return Ok(None);
        }
        if tables.catalog_kind(input.supplier_id).is_none() {
            return Err(RepositoryError::Conflict("supplier does not exist".into()));
        }
        let Some(record) = tables.inventory.get_mut(&id.as_i32()) else {
            return Ok(None);
        };
        record.quantity = record
            .quantity
            .checked_add(input.quantity)
            .ok_or_else(|| RepositoryError::Conflict("quantity out of range".into()))?;
        record.price = input.price;
        record.supplier_id = input.supplier_id;
        record.updated_at = Utc::now();
        Ok(Some(record.clone()))
    }

    async fn delete_inventory(&self, id: InventoryId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.sales.values().any(|s| s.inventory_id == id) {
            return Err(RepositoryError::Conflict(
                "inventory record has recorded sales".into(),
            ));
        }
        Ok(tables.inventory.remove(&id.as_i32()).is_some())
    }
}

#[async_trait]
impl SaleStore for InMemoryStore {
    async fn record_sale(&self, sale: &NewSale) -> Result<SaleOutcome, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        let Some(record) = tables.inventory.get_mut(&sale.inventory_id.as_i32()) else {
            return Ok(SaleOutcome::InventoryMissing);
        };
        if sale.quantity_sold > record.quantity {
            return Ok(SaleOutcome::InsufficientStock {
                available: record.quantity,
            });
        }

        let Some(profit) = compute_profit(sale.selling_price, record.price, sale.quantity_sold)
        else {
            return Err(RepositoryError::Conflict("sale profit out of range".into()));
        };

        let now = Utc::now();
        record.quantity -= sale.quantity_sold;
        record.updated_at = now;
        let remaining = record.quantity;

        let created = Sale {
            id: SaleId::new(id),
            inventory_id: sale.inventory_id,
            item_id: record.item_id,
            quantity_sold: sale.quantity_sold,
            selling_price: sale.selling_price,
            unit_cost: record.price,
            profit,
            sold_by: Some(sale.sold_by),
            created_at: now,
        };
        tables.sales.insert(id, created.clone());
        Ok(SaleOutcome::Recorded {
            sale: created,
            remaining,
        })
    }

    async fn get_sale(&self, id: SaleId) -> Result<Option<Sale>, RepositoryError> {
        Ok(self.tables.lock().await.sales.get(&id.as_i32()).cloned())
    }

    async fn list_sales(&self, filter: &SaleFilter) -> Result<Vec<Sale>, RepositoryError> {
        let tables = self.tables.lock().await;
        let sales = tables
            .sales
            .values()
            .filter(|s| filter.inventory_id.is_none_or(|id| s.inventory_id == id))
            .cloned()
            .collect();
        Ok(newest_first(sales, |s| (s.created_at, s.id.as_i32())))
    }
}

#[async_trait]
impl ShapeStore for InMemoryStore {
    async fn insert_shape(
        &self,
        input: &ShapeInput,
        created_by: UserId,
    ) -> Result<MapShape, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let id = tables.next_id();
        let shape = MapShape {
            id: ShapeId::new(id),
            kind: input.kind,
            geojson: input.geojson.clone(),
            radius: input.radius,
            title: input.title.clone(),
            description: input.description.clone(),
            status: input.status,
            color: input.color.clone(),
            size: input.size.clone(),
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        };
        tables.shapes.insert(id, shape.clone());
        Ok(shape)
    }

    async fn get_shape(&self, id: ShapeId) -> Result<Option<MapShape>, RepositoryError> {
        Ok(self.tables.lock().await.shapes.get(&id.as_i32()).cloned())
    }

    async fn list_shapes(&self) -> Result<Vec<MapShape>, RepositoryError> {
        Ok(self.tables.lock().await.shapes.values().cloned().collect())
    }

    async fn update_shape(
        &self,
        id: ShapeId,
        input: &ShapeInput,
    ) -> Result<Option<MapShape>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let Some(shape) = tables.shapes.get_mut(&id.as_i32()) else {
            return Ok(None);
        };
        shape.kind = input.kind;
        shape.geojson = input.geojson.clone();
        shape.radius = input.radius;
        shape.title.clone_from(&input.title);
        shape.description.clone_from(&input.description);
        shape.status = input.status;
        shape.color.clone_from(&input.color);
        shape.updated_at = Utc::now();
        Ok(Some(shape.clone()))
    }

    async fn delete_shape(&self, id: ShapeId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let removed = tables.shapes.remove(&id.as_i32()).is_some();
        if removed {
            tables.pipe_logs.retain(|_, log| log.shape_id != id);
        }
        Ok(removed)
    }

    async fn append_pipe_log(
        &self,
        shape_id: ShapeId,
        log: &NewPipeLog,
    ) -> Result<Option<(MapShape, PipeLog)>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables.shapes.contains_key(&shape_id.as_i32()) {
            return Ok(None);
        }
        let latest = tables
            .pipe_logs
            .values()
            .filter(|l| l.shape_id == shape_id)
            .map(|l| l.created_at)
            .max();
        let now = Utc::now();
        let created_at = latest.map_or(now, |latest| latest.max(now));
        let id = tables.next_id();

        let Some(shape) = tables.shapes.get_mut(&shape_id.as_i32()) else {
            return Ok(None);
        };
        shape.size = Some(log.size.clone());
        shape.updated_at = now;
        let shape = shape.clone();

        let entry = PipeLog {
            id: PipeLogId::new(id),
            shape_id,
            size: log.size.clone(),
            remarks: log.remarks.clone(),
            logged_by: Some(log.logged_by),
            created_at,
        };
        tables.pipe_logs.insert(id, entry.clone());
        Ok(Some((shape, entry)))
    }

    async fn list_pipe_logs(&self, shape_id: ShapeId) -> Result<Vec<PipeLog>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut logs: Vec<PipeLog> = tables
            .pipe_logs
            .values()
            .filter(|l| l.shape_id == shape_id)
            .cloned()
            .collect();
        logs.sort_by_key(|l| (l.created_at, l.id.as_i32()));
        Ok(logs)
    }
}

#[async_trait]
impl NoteStore for InMemoryStore {
    async fn insert_note(
        &self,
        input: &NoteInput,
        created_by: UserId,
    ) -> Result<Note, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let id = tables.next_id();
        let note = Note {
            id: NoteId::new(id),
            title: input.title.clone(),
            body: input.body.clone(),
            latitude: input.latitude,
            longitude: input.longitude,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        };
        tables.notes.insert(id, note.clone());
        Ok(note)
    }

    async fn get_note(&self, id: NoteId) -> Result<Option<Note>, RepositoryError> {
        Ok(self.tables.lock().await.notes.get(&id.as_i32()).cloned())
    }

    async fn list_notes(&self) -> Result<Vec<Note>, RepositoryError> {
        let notes = self.tables.lock().await.notes.values().cloned().collect();
        Ok(newest_first(notes, |n| (n.created_at, n.id.as_i32())))
    }

    async fn update_note(
        &self,
        id: NoteId,
        input: &NoteInput,
    ) -> Result<Option<Note>, RepositoryError> {
        let mut tables = self.tables.lock().await;
        let Some(note) = tables.notes.get_mut(&id.as_i32()) else {
            return Ok(None);
        };
        note.title.clone_from(&input.title);
        note.body.clone_from(&input.body);
        note.latitude = input.latitude;
        note.longitude = input.longitude;
        note.updated_at = Utc::now();
        Ok(Some(note.clone()))
    }

    async fn delete_note(&self, id: NoteId) -> Result<bool, RepositoryError> {
        Ok(self.tables.lock().await.notes.remove(&id.as_i32()).is_some())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables
            .users
            .values()
            .any(|c| c.user.username == user.username)
        {
            return Err(RepositoryError::Conflict("username already taken".into()));
        }
        let now = Utc::now();
        let id = tables.next_id();
        let created = User {
            id: UserId::new(id),
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(
            id,
            UserCredentials {
                user: created.clone(),
                password_hash: user.password_hash.clone(),
            },
        );
        Ok(created)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .tables
            .lock()
            .await
            .users
            .get(&id.as_i32())
            .map(|c| c.user.clone()))
    }

    async fn find_credentials(
        &self,
        username: &Username,
    ) -> Result<Option<UserCredentials>, RepositoryError> {
        Ok(self
            .tables
            .lock()
            .await
            .users
            .values()
            .find(|c| &c.user.username == username)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut users: Vec<User> = tables.users.values().map(|c| c.user.clone()).collect();
        users.sort_by(|a, b| a.username.as_str().cmp(b.username.as_str()));
        Ok(users)
    }

    async fn delete_user(&self, id: UserId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if tables.users.remove(&id.as_i32()).is_none() {
            return Ok(false);
        }

        let gone: Vec<ConversationId> = tables
            .conversations
            .values()
            .filter(|c| c.includes(id))
            .map(|c| c.id)
            .collect();
        tables.conversations.retain(|_, c| !c.includes(id));
        tables
            .messages
            .retain(|_, m| m.sender_id != id && !gone.contains(&m.conversation_id));

        let author = Some(id);
        for sale in tables.sales.values_mut().filter(|s| s.sold_by == author) {
            sale.sold_by = None;
        }
        for shape in tables.shapes.values_mut().filter(|s| s.created_by == author) {
            shape.created_by = None;
        }
        for log in tables.pipe_logs.values_mut().filter(|l| l.logged_by == author) {
            log.logged_by = None;
        }
        for note in tables.notes.values_mut().filter(|n| n.created_by == author) {
            note.created_by = None;
        }
        for entry in tables.audit.values_mut().filter(|e| e.user_id == author) {
            entry.user_id = None;
        }
        Ok(true)
    }
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn find_or_create_conversation(
        &self,
        a: UserId,
        b: UserId,
    ) -> Result<Conversation, RepositoryError> {
        let (low, high) = Conversation::ordered_pair(a, b);
        let mut tables = self.tables.lock().await;
        if let Some(existing) = tables
            .conversations
            .values()
            .find(|c| c.participant_low == low && c.participant_high == high)
        {
            return Ok(existing.clone());
        }
        if !tables.users.contains_key(&low.as_i32()) || !tables.users.contains_key(&high.as_i32())
        {
            return Err(RepositoryError::Conflict("participant does not exist".into()));
        }
        let id = tables.next_id();
        let conversation = Conversation {
            id: ConversationId::new(id),
            participant_low: low,
            participant_high: high,
            created_at: Utc::now(),
        };
        tables.conversations.insert(id, conversation.clone());
        Ok(conversation)
    }

    async fn get_conversation(
        &self,
        id: ConversationId,
    ) -> Result<Option<Conversation>, RepositoryError> {
        Ok(self
            .tables
            .lock()
            .await
            .conversations
            .get(&id.as_i32())
            .cloned())
    }

    async fn list_conversations_for(
        &self,
        user: UserId,
    ) -> Result<Vec<Conversation>, RepositoryError> {
        let tables = self.tables.lock().await;
        let conversations = tables
            .conversations
            .values()
            .filter(|c| c.includes(user))
            .cloned()
            .collect();
        Ok(newest_first(conversations, |c| (c.created_at, c.id.as_i32())))
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<Message, RepositoryError> {
        let mut tables = self.tables.lock().await;
        if !tables
            .conversations
            .contains_key(&message.conversation_id.as_i32())
        {
            return Err(RepositoryError::Conflict(
                "conversation does not exist".into(),
            ));
        }
        let id = tables.next_id();
        let created = Message {
            id: MessageId::new(id),
            conversation_id: message.conversation_id,
            sender_id: message.sender_id,
            body: message.body.clone(),
            created_at: Utc::now(),
        };
        tables.messages.insert(id, created.clone());
        Ok(created)
    }

    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<Message>, RepositoryError> {
        let tables = self.tables.lock().await;
        let mut messages: Vec<Message> = tables
            .messages
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| (m.created_at, m.id.as_i32()));
        Ok(messages)
    }
}

#[async_trait]
impl AuditStore for InMemoryStore {
    async fn list_audit_entries(&self, limit: i64) -> Result<Vec<AuditEntry>, RepositoryError> {
        let tables = self.tables.lock().await;
        let entries = newest_first(tables.audit.values().cloned().collect(), |e| {
            (e.created_at, e.id.as_i32())
        });
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(entries.into_iter().take(limit).collect())
    }
}

#[async_trait]
impl AuditSink for InMemoryStore {
    async fn append_audit_entry(&self, entry: &NewAuditEntry) -> Result<(), RepositoryError> {
        let mut tables = self.tables.lock().await;
        let id = tables.next_id();
        tables.audit.insert(
            id,
            AuditEntry {
                id: AuditEntryId::new(id),
                user_id: entry.user_id,
                action: entry.action,
                entity: entry.entity.clone(),
                entity_id: entry.entity_id,
                detail: entry.detail.clone(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use waterline_core::UserRole;

    use super::*;

    async fn seed_inventory(store: &InMemoryStore, quantity: i32) -> InventoryRecord {
        let category = store
            .insert_catalog_entry(&NewCatalogEntry {
                kind: CatalogKind::Category,
                name: "Fittings".into(),
                description: None,
                parent_id: None,
            })
            .await
            .unwrap();
        let item = store
            .insert_catalog_entry(&NewCatalogEntry {
                kind: CatalogKind::Item,
                name: "Gate valve".into(),
                description: None,
                parent_id: Some(category.id),
            })
            .await
            .unwrap();
        let supplier = store
            .insert_catalog_entry(&NewCatalogEntry {
                kind: CatalogKind::Supplier,
                name: "Acme Pipes".into(),
                description: None,
                parent_id: None,
            })
            .await
            .unwrap();
        store
            .insert_inventory(&CreateInventoryInput {
                item_id: item.id,
                supplier_id: supplier.id,
                quantity,
                price: Decimal::new(500, 2),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_catalog_entry_in_use_cannot_be_deleted() {
        let store = InMemoryStore::new();
        let record = seed_inventory(&store, 1).await;

        let err = store.delete_catalog_entry(record.item_id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert!(store.get_catalog_entry(record.item_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_inventory_with_sales_cannot_be_deleted() {
        let store = InMemoryStore::new();
        let record = seed_inventory(&store, 5).await;
        let outcome = store
            .record_sale(&NewSale {
                inventory_id: record.id,
                quantity_sold: 1,
                selling_price: Decimal::new(700, 2),
                sold_by: UserId::new(99),
            })
            .await
            .unwrap();
        assert!(matches!(outcome, SaleOutcome::Recorded { remaining: 4, .. }));

        let err = store.delete_inventory(record.id).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_restock_overflow_is_rejected() {
        let store = InMemoryStore::new();
        let record = seed_inventory(&store, i32::MAX - 1).await;
        let err = store
            .restock_inventory(
                record.id,
                &RestockInput {
                    quantity: 2,
                    price: record.price,
                    supplier_id: record.supplier_id,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        let unchanged = store.get_inventory(record.id).await.unwrap().unwrap();
        assert_eq!(unchanged.quantity, i32::MAX - 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = InMemoryStore::new();
        let user = NewUser {
            username: Username::parse("clerk").unwrap(),
            full_name: "Clerk".into(),
            password_hash: "hash".into(),
            role: UserRole::User,
        };
        store.insert_user(&user).await.unwrap();
        let err = store.insert_user(&user).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_conversation_is_shared_per_pair() {
        let store = InMemoryStore::new();
        let mut ids = Vec::new();
        for name in ["ana", "ben"] {
            let user = store
                .insert_user(&NewUser {
                    username: Username::parse(name).unwrap(),
                    full_name: name.into(),
                    password_hash: "hash".into(),
                    role: UserRole::User,
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        let first = store
            .find_or_create_conversation(ids[0], ids[1])
            .await
            .unwrap();
        let second = store
            .find_or_create_conversation(ids[1], ids[0])
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_deleting_user_drops_their_conversations() {
        let store = InMemoryStore::new();
        let mut ids = Vec::new();
        for name in ["ana", "ben"] {
            let user = store
                .insert_user(&NewUser {
                    username: Username::parse(name).unwrap(),
                    full_name: name.into(),
                    password_hash: "hash".into(),
                    role: UserRole::User,
                })
                .await
                .unwrap();
            ids.push(user.id);
        }
        let conversation = store
            .find_or_create_conversation(ids[0], ids[1])
            .await
            .unwrap();
        store
            .insert_message(&NewMessage {
                conversation_id: conversation.id,
                sender_id: ids[0],
                body: "cipher".into(),
            })
            .await
            .unwrap();

        assert!(store.delete_user(ids[0]).await.unwrap());
        assert!(store.get_conversation(conversation.id).await.unwrap().is_none());
        assert!(store.list_messages(conversation.id).await.unwrap().is_empty());
        assert!(store.list_conversations_for(ids[1]).await.unwrap().is_empty());
    }
}
