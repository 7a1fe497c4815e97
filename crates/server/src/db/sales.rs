//! Database operations for sales.
//!
//! Recording a sale locks the inventory row, so the stock check, the
//! decrement and the sale insert see one consistent quantity and price.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use waterline_core::{CatalogEntryId, InventoryId, SaleId, UserId};

use super::inventory::{COLUMNS as INVENTORY_COLUMNS, InventoryRow};
use super::{PgStore, RepositoryError};
use crate::models::{InventoryRecord, NewSale, Sale, SaleFilter, SaleOutcome, compute_profit};
use crate::store::SaleStore;

const COLUMNS: &str = "id, inventory_id, item_id, quantity_sold, selling_price, unit_cost, \
                       profit, sold_by, created_at";

#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: i32,
    inventory_id: i32,
    item_id: i32,
    quantity_sold: i32,
    selling_price: Decimal,
    unit_cost: Decimal,
    profit: Decimal,
    sold_by: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<SaleRow> for Sale {
    fn from(row: SaleRow) -> Self {
        Self {
            id: SaleId::new(row.id),
            inventory_id: InventoryId::new(row.inventory_id),
            item_id: CatalogEntryId::new(row.item_id),
            quantity_sold: row.quantity_sold,
            selling_price: row.selling_price,
            unit_cost: row.unit_cost,
            profit: row.profit,
            sold_by: row.sold_by.map(UserId::new),
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl SaleStore for PgStore {
    async fn record_sale(&self, sale: &NewSale) -> Result<SaleOutcome, RepositoryError> {
        let mut tx = self.pool().begin().await?;

        let locked = sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM waterline.inventory WHERE id = $1 FOR UPDATE"
        ))
        .bind(sale.inventory_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(record) = locked.map(InventoryRecord::from) else {
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

        let remaining: i32 = sqlx::query_scalar(
            "UPDATE waterline.inventory
             SET quantity = quantity - $2, updated_at = now()
             WHERE id = $1
             RETURNING quantity",
        )
        .bind(record.id)
        .bind(sale.quantity_sold)
        .fetch_one(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, SaleRow>(&format!(
            "INSERT INTO waterline.sale
                (inventory_id, item_id, quantity_sold, selling_price, unit_cost, profit, sold_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(record.id)
        .bind(record.item_id)
        .bind(sale.quantity_sold)
        .bind(sale.selling_price)
        .bind(record.price)
        .bind(profit)
        .bind(sale.sold_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::from_write(e, "sale rejected by constraint"))?;

        tx.commit().await?;

        Ok(SaleOutcome::Recorded {
            sale: row.into(),
            remaining,
        })
    }

    async fn get_sale(&self, id: SaleId) -> Result<Option<Sale>, RepositoryError> {
        let row = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {COLUMNS} FROM waterline.sale WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_sales(&self, filter: &SaleFilter) -> Result<Vec<Sale>, RepositoryError> {
        let rows = sqlx::query_as::<_, SaleRow>(&format!(
            "SELECT {COLUMNS} FROM waterline.sale
             WHERE ($1::INTEGER IS NULL OR inventory_id = $1)
             ORDER BY created_at DESC, id DESC"
        ))
        .bind(filter.inventory_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
