//! Recording sales against inventory.

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use waterline_core::SaleId;

use super::{AuditLog, ServiceError, check_money, require_admin};
use crate::models::{
    AuditAction, CreateSaleInput, NewAuditEntry, NewSale, RequestContext, Sale, SaleFilter,
    SaleOutcome,
};
use crate::store::{AuditSink, Store};

/// Sales.
pub struct SalesService<'a> {
    store: &'a dyn Store,
    audit: AuditLog<'a>,
}

impl<'a> SalesService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store, audit: &'a dyn AuditSink) -> Self {
        Self {
            store,
            audit: AuditLog::new(audit),
        }
    }

    /// Sell `quantity_sold` units from an inventory record.
    ///
    /// Stock is checked and decremented atomically with the sale insert.
    /// The sale keeps the inventory price at the time of sale as its unit
    /// cost, so later price changes never alter its profit.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Validation` for a non-positive quantity or a
    /// selling price that is non-positive, above [`super::MAX_PRICE`] or
    /// finer than cents, `ServiceError::NotFound` if the inventory record
    /// does not exist, and `ServiceError::InsufficientStock` if fewer units
    /// are on hand than requested.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateSaleInput,
    ) -> Result<Sale, ServiceError> {
        require_admin(ctx)?;
        if input.quantity_sold <= 0 {
            return Err(ServiceError::validation("quantity must be positive"));
        }
        if input.selling_price <= Decimal::ZERO {
            return Err(ServiceError::validation("selling price must be positive"));
        }
        check_money(input.selling_price, "selling price")?;

        let outcome = self
            .store
            .record_sale(&NewSale {
                inventory_id: input.inventory_id,
                quantity_sold: input.quantity_sold,
                selling_price: input.selling_price,
                sold_by: ctx.user_id,
            })
            .await?;

        let (sale, remaining) = match outcome {
            SaleOutcome::Recorded { sale, remaining } => (sale, remaining),
            SaleOutcome::InventoryMissing => {
                return Err(ServiceError::NotFound("inventory record"));
            }
            SaleOutcome::InsufficientStock { available } => {
                warn!(
                    inventory_id = %input.inventory_id,
                    requested = input.quantity_sold,
                    available,
                    "Sale rejected: insufficient stock"
                );
                return Err(ServiceError::InsufficientStock {
                    requested: input.quantity_sold,
                    available,
                });
            }
        };

        info!(
            sale_id = %sale.id,
            inventory_id = %sale.inventory_id,
            quantity = sale.quantity_sold,
            profit = %sale.profit,
            remaining,
            "Sale recorded"
        );
        self.audit
            .record(
                NewAuditEntry::new(ctx.user_id, AuditAction::Sell, "sale")
                    .with_id(sale.id)
                    .with_detail(format!(
                        "inventory {} qty {} @ {}",
                        sale.inventory_id, sale.quantity_sold, sale.selling_price
                    )),
            )
            .await;
        Ok(sale)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotFound` if the sale does not exist.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn get(&self, ctx: &RequestContext, id: SaleId) -> Result<Sale, ServiceError> {
        self.store
            .get_sale(id)
            .await?
            .ok_or(ServiceError::NotFound("sale"))
    }

    /// Newest first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Repository` on storage failure.
    #[instrument(skip(self), fields(user_id = %ctx.user_id))]
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: SaleFilter,
    ) -> Result<Vec<Sale>, ServiceError> {
        Ok(self.store.list_sales(&filter).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::RestockInput;
    use crate::services::testing::{ADMIN, FailingSink, VIEWER, seed_stock};
    use crate::services::{InventoryService, MAX_PRICE};
    use crate::store::memory::InMemoryStore;
    use crate::store::{AuditStore, InventoryStore, SaleStore};

    fn sale(record: &crate::models::InventoryRecord, quantity: i32, price: i64) -> CreateSaleInput {
        CreateSaleInput {
            inventory_id: record.id,
            quantity_sold: quantity,
            selling_price: Decimal::new(price, 2),
        }
    }

    #[tokio::test]
    async fn test_sale_decrements_stock_and_snapshots_profit() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 10, Decimal::new(500, 2)).await;
        let service = SalesService::new(&store, &store);

        let sold = service.create(&ADMIN, sale(&record, 3, 800)).await.unwrap();

        assert_eq!(sold.quantity_sold, 3);
        assert_eq!(sold.unit_cost, Decimal::new(500, 2));
        assert_eq!(sold.profit, Decimal::new(900, 2));
        assert_eq!(sold.item_id, record.item_id);
        assert_eq!(sold.sold_by, Some(ADMIN.user_id));
        let after = store.get_inventory(record.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 7);

        let audit = store.list_audit_entries(10).await.unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].action, AuditAction::Sell);
        assert_eq!(audit[0].entity_id, Some(sold.id.as_i32()));
    }

    #[tokio::test]
    async fn test_oversell_leaves_stock_untouched() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 10, Decimal::new(500, 2)).await;
        let service = SalesService::new(&store, &store);

        let err = service.create(&ADMIN, sale(&record, 11, 800)).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::InsufficientStock {
                requested: 11,
                available: 10
            }
        ));
        let after = store.get_inventory(record.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 10);
        assert!(service.list(&ADMIN, SaleFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_selling_everything_is_allowed() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 4, Decimal::new(500, 2)).await;
        let service = SalesService::new(&store, &store);

        service.create(&ADMIN, sale(&record, 4, 600)).await.unwrap();
        let after = store.get_inventory(record.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 0);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected_before_lookup() {
        let store = InMemoryStore::new();
        let service = SalesService::new(&store, &store);
        let missing = CreateSaleInput {
            inventory_id: waterline_core::InventoryId::new(42),
            quantity_sold: 0,
            selling_price: Decimal::new(800, 2),
        };

        let err = service.create(&ADMIN, missing.clone()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = service
            .create(
                &ADMIN,
                CreateSaleInput {
                    quantity_sold: 1,
                    selling_price: Decimal::ZERO,
                    ..missing.clone()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = service
            .create(
                &ADMIN,
                CreateSaleInput {
                    quantity_sold: 1,
                    ..missing
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_out_of_range_selling_price_leaves_stock_untouched() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 10, Decimal::new(500, 2)).await;
        let service = SalesService::new(&store, &store);

        for selling_price in [Decimal::MAX, MAX_PRICE + Decimal::new(1, 2)] {
            let err = service
                .create(
                    &ADMIN,
                    CreateSaleInput {
                        inventory_id: record.id,
                        quantity_sold: 2,
                        selling_price,
                    },
                )
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)));
        }

        let after = store.get_inventory(record.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 10);
        assert!(service.list(&ADMIN, SaleFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sub_cent_selling_price_is_rejected() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 1000, Decimal::new(500, 2)).await;
        let service = SalesService::new(&store, &store);

        let err = service
            .create(
                &ADMIN,
                CreateSaleInput {
                    inventory_id: record.id,
                    quantity_sold: 1000,
                    selling_price: Decimal::new(5005, 3),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        // Trailing zeros are not extra precision.
        let sold = service
            .create(
                &ADMIN,
                CreateSaleInput {
                    inventory_id: record.id,
                    quantity_sold: 1000,
                    selling_price: Decimal::new(5010, 3),
                },
            )
            .await
            .unwrap();
        assert_eq!(sold.profit, Decimal::new(1000, 2));
    }

    #[tokio::test]
    async fn test_profit_overflow_in_store_writes_nothing() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 10, Decimal::new(500, 2)).await;

        let err = store
            .record_sale(&NewSale {
                inventory_id: record.id,
                quantity_sold: 2,
                selling_price: Decimal::MAX,
                sold_by: ADMIN.user_id,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, crate::db::RepositoryError::Conflict(_)));
        let after = store.get_inventory(record.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 10);
        assert!(store.list_sales(&SaleFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_profit_ignores_later_price_changes() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 10, Decimal::new(500, 2)).await;
        let sales = SalesService::new(&store, &store);
        let inventory = InventoryService::new(&store, &store);

        let sold = sales.create(&ADMIN, sale(&record, 2, 800)).await.unwrap();
        inventory
            .restock(
                &ADMIN,
                record.id,
                RestockInput {
                    quantity: 0,
                    price: Decimal::new(900, 2),
                    supplier_id: record.supplier_id,
                },
            )
            .await
            .unwrap();

        let reread = sales.get(&ADMIN, sold.id).await.unwrap();
        assert_eq!(reread.profit, Decimal::new(600, 2));
        assert_eq!(reread.unit_cost, Decimal::new(500, 2));
    }

    #[tokio::test]
    async fn test_sale_survives_audit_failure() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 10, Decimal::new(500, 2)).await;
        let service = SalesService::new(&store, &FailingSink);

        let sold = service.create(&ADMIN, sale(&record, 3, 800)).await.unwrap();
        assert_eq!(sold.profit, Decimal::new(900, 2));
        let after = store.get_inventory(record.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 7);
    }

    #[tokio::test]
    async fn test_viewer_cannot_sell() {
        let store = InMemoryStore::new();
        let record = seed_stock(&store, 10, Decimal::new(500, 2)).await;
        let service = SalesService::new(&store, &store);

        let err = service.create(&VIEWER, sale(&record, 1, 800)).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));
    }

    #[tokio::test]
    async fn test_concurrent_sales_never_oversell() {
        let store = Arc::new(InMemoryStore::new());
        let record = seed_stock(&store, 10, Decimal::new(500, 2)).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            let input = sale(&record, 3, 800);
            handles.push(tokio::spawn(async move {
                SalesService::new(store.as_ref(), store.as_ref())
                    .create(&ADMIN, input)
                    .await
                    .is_ok()
            }));
        }

        let mut succeeded = 0;
        for handle in handles {
            if handle.await.unwrap() {
                succeeded += 1;
            }
        }

        assert_eq!(succeeded, 3);
        let after = store.get_inventory(record.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 1);
    }
}
