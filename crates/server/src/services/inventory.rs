//! Inventory records and restocking.

use rust_decimal::Decimal;
use tracing::{info, instrument};

use waterline_core::{CatalogEntryId, CatalogKind, InventoryId};

use super::{AuditLog, ServiceError, check_money, require_admin};
use crate::models::{
    AuditAction, CreateInventoryInput, InventoryFilter, InventoryRecord, NewAuditEntry,
    RequestContext, RestockInput,
};
use crate::store::{AuditSink, Store};

/// Inventory management.
pub struct InventoryService<'a> {
    store: &'a dyn Store,
    audit: AuditLog<'a>,
}

impl<'a> InventoryService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, audit: &'a dyn AuditSink) -> Self {
        Self {
            store,
            audit: AuditLog::new(audit),
        }
    }

    /// Create an inventory record for an item at a supplier.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a negative quantity, a price
    /// that is negative, above [`super::MAX_PRICE`] or finer than cents, or
    /// when `item_id`/`supplier_id` do not name an item/supplier.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateInventoryInput,
    ) -> Result<InventoryRecord, ServiceError> {
        require_admin(ctx)?;
        if input.quantity < 0 {
            return Err(ServiceError::validation("quantity must not be negative"));
        }
        check_price(input.price)?;
        self.require_kind(input.item_id, CatalogKind::Item).await?;
        self.require_kind(input.supplier_id, CatalogKind::Supplier)
            .await?;

        let record = self.store.insert_inventory(&input).await?;

        info!(id = %record.id, quantity = record.quantity, "Inventory record created");
        self.audit
            .record(
                NewAuditEntry::new(ctx.user_id, AuditAction::Create, "inventory")
                    .with_id(record.id)
                    .with_detail(format!("qty {} @ {}", record.quantity, record.price)),
            )
            .await;
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the record does not exist.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn get(
        &self,
        ctx: &RequestContext,
        id: InventoryId,
    ) -> Result<InventoryRecord, ServiceError> {
        self.store
            .get_inventory(id)
            .await?
            .ok_or(ServiceError::NotFound("inventory record"))
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on storage failure.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: InventoryFilter,
    ) -> Result<Vec<InventoryRecord>, ServiceError> {
        Ok(self.store.list_inventory(&filter).await?)
    }

    /// Restock: add `input.quantity` to what is on hand and replace price
    /// and supplier.
    ///
    /// The quantity is a delta, not a new total.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a negative delta or price or a
    /// supplier that is not a supplier, `ServiceError::NotFound` if the
    /// record does not exist, and `ServiceError::Conflict` if the sum
    /// overflows.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn restock(
        &self,
        ctx: &RequestContext,
        id: InventoryId,
        input: RestockInput,
    ) -> Result<InventoryRecord, ServiceError> {
        require_admin(ctx)?;
        if input.quantity < 0 {
            return Err(ServiceError::validation(
                "restock quantity must not be negative",
            ));
        }
        check_price(input.price)?;
        self.get(ctx, id).await?;
        self.require_kind(input.supplier_id, CatalogKind::Supplier)
            .await?;

        let record = self
            .store
            .restock_inventory(id, &input)
            .await?
            .ok_or(ServiceError::NotFound("inventory record"))?;

        info!(%id, added = input.quantity, quantity = record.quantity, "Inventory restocked");
        self.audit
            .record(
                NewAuditEntry::new(ctx.user_id, AuditAction::Restock, "inventory")
                    .with_id(id)
                    .with_detail(format!("+{} now {}", input.quantity, record.quantity)),
            )
            .await;
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the record does not exist and
    /// `ServiceError::Conflict` if sales reference it.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn delete(&self, ctx: &RequestContext, id: InventoryId) -> Result<(), ServiceError> {
        require_admin(ctx)?;
        if !self.store.delete_inventory(id).await? {
            return Err(ServiceError::NotFound("inventory record"));
        }

        info!(%id, "Inventory record deleted");
        self.audit
            .record(NewAuditEntry::new(ctx.user_id, AuditAction::Delete, "inventory").with_id(id))
            .await;
        Ok(())
    }

    async fn require_kind(
        &self,
        id: CatalogEntryId,
        kind: CatalogKind,
    ) -> Result<(), ServiceError> {
        match self.store.get_catalog_entry(id).await? {
            Some(entry) if entry.kind == kind => Ok(()),
            _ => Err(ServiceError::validation(format!("{id} is not a {kind}"))),
        }
    }
}

fn check_price(price: Decimal) -> Result<(), ServiceError> {
    if price.is_sign_negative() {
        return Err(ServiceError::validation("price must not be negative"));
    }
    check_money(price, "price")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::testing::{ADMIN, ENGR, FailingSink, seed_stock};
    use crate::store::memory::InMemoryStore;
    use crate::store::{AuditStore, InventoryStore};

    #[tokio::test]
    async fn test_restock_adds_to_existing_quantity() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 10, Decimal::new(500, 2)).await;
        let service = InventoryService::new(&store, &store);

        // Supplying the intended total does not set it.
        let updated = service
            .restock(
                &ADMIN,
                record.id,
                RestockInput {
                    quantity: 25,
                    price: Decimal::new(550, 2),
                    supplier_id: record.supplier_id,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.quantity, 35);
        assert_eq!(updated.price, Decimal::new(550, 2));
        assert_eq!(updated.amount(), Some(Decimal::new(19250, 2)));
    }

    #[tokio::test]
    async fn test_restock_from_zero_reaches_supplied_quantity() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 0, Decimal::new(500, 2)).await;
        let service = InventoryService::new(&store, &store);

        let updated = service
            .restock(
                &ADMIN,
                record.id,
                RestockInput {
                    quantity: 12,
                    price: record.price,
                    supplier_id: record.supplier_id,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.quantity, 12);
    }

    #[tokio::test]
    async fn test_negative_restock_is_rejected() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 10, Decimal::new(500, 2)).await;
        let service = InventoryService::new(&store, &store);

        let err = service
            .restock(
                &ADMIN,
                record.id,
                RestockInput {
                    quantity: -3,
                    price: record.price,
                    supplier_id: record.supplier_id,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(store.get_inventory(record.id).await.unwrap().unwrap().quantity, 10);
    }

    #[tokio::test]
    async fn test_restock_unknown_record_is_not_found() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 10, Decimal::new(500, 2)).await;
        let service = InventoryService::new(&store, &store);

        let err = service
            .restock(
                &ADMIN,
                InventoryId::new(9999),
                RestockInput {
                    quantity: 1,
                    price: record.price,
                    supplier_id: record.supplier_id,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_checks_catalog_kinds() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 1, Decimal::ONE).await;
        let service = InventoryService::new(&store, &store);

        // Item and supplier swapped.
        let err = service
            .create(
                &ADMIN,
                CreateInventoryInput {
                    item_id: record.supplier_id,
                    supplier_id: record.item_id,
                    quantity: 1,
                    price: Decimal::ONE,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn test_price_must_fit_in_cents() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 10, Decimal::new(500, 2)).await;
        let service = InventoryService::new(&store, &store);

        for price in [Decimal::new(5005, 3), Decimal::MAX] {
            let err = service
                .restock(
                    &ADMIN,
                    record.id,
                    RestockInput {
                        quantity: 1,
                        price,
                        supplier_id: record.supplier_id,
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));

            let err = service
                .create(
                    &ADMIN,
                    CreateInventoryInput {
                        item_id: record.item_id,
                        supplier_id: record.supplier_id,
                        quantity: 1,
                        price,
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }

        let unchanged = store.get_inventory(record.id).await.unwrap().unwrap();
        assert_eq!(unchanged.quantity, 10);
        assert_eq!(unchanged.price, Decimal::new(500, 2));
    }

    #[tokio::test]
    async fn test_engineer_cannot_restock() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 10, Decimal::new(500, 2)).await;
        let service = InventoryService::new(&store, &store);

        let err = service
            .restock(
                &ENGR,
                record.id,
                RestockInput {
                    quantity: 1,
                    price: record.price,
                    supplier_id: record.supplier_id,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));
    }

    #[tokio::test]
    async fn test_restock_survives_audit_failure() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 10, Decimal::new(500, 2)).await;
        let service = InventoryService::new(&store, &FailingSink);

        let updated = service
            .restock(
                &ADMIN,
                record.id,
                RestockInput {
                    quantity: 5,
                    price: record.price,
                    supplier_id: record.supplier_id,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.quantity, 15);
        assert!(store.list_audit_entries(10).await.unwrap().is_empty());
    }
}
