//! Database operations for inventory records.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use waterline_core::{CatalogEntryId, InventoryId};

use super::{PgStore, RepositoryError};
use crate::models::{CreateInventoryInput, InventoryFilter, InventoryRecord, RestockInput};
use crate::store::InventoryStore;

pub(super) const COLUMNS: &str = "id, item_id, supplier_id, quantity, price, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub(super) struct InventoryRow {
    id: i32,
    item_id: i32,
    supplier_id: i32,
    quantity: i32,
    price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<InventoryRow> for InventoryRecord {
    fn from(row: InventoryRow) -> Self {
        Self {
            id: InventoryId::new(row.id),
            item_id: CatalogEntryId::new(row.item_id),
            supplier_id: CatalogEntryId::new(row.supplier_id),
            quantity: row.quantity,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn insert_inventory(
        &self,
        input: &CreateInventoryInput,
    ) -> Result<InventoryRecord, RepositoryError> {
        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            "INSERT INTO waterline.inventory (item_id, supplier_id, quantity, price)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        ))
        .bind(input.item_id)
        .bind(input.supplier_id)
        .bind(input.quantity)
        .bind(input.price)
        .fetch_one(self.pool())
        .await
        .map_err(|e| RepositoryError::from_write(e, "item or supplier does not exist"))?;

        Ok(row.into())
    }

    async fn get_inventory(
        &self,
        id: InventoryId,
    ) -> Result<Option<InventoryRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {COLUMNS} FROM waterline.inventory WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn list_inventory(
        &self,
        filter: &InventoryFilter,
    ) -> Result<Vec<InventoryRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, InventoryRow>(&format!(
            "SELECT {COLUMNS} FROM waterline.inventory
             WHERE ($1::INTEGER IS NULL OR item_id = $1)
               AND ($2::INTEGER IS NULL OR supplier_id = $2)
             ORDER BY id"
        ))
        .bind(filter.item_id)
        .bind(filter.supplier_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn restock_inventory(
        &self,
        id: InventoryId,
        input: &RestockInput,
    ) -> Result<Option<InventoryRecord>, RepositoryError> {
        // Additive in one statement so concurrent restocks and sales compose.
        let row = sqlx::query_as::<_, InventoryRow>(&format!(
            "UPDATE waterline.inventory
             SET quantity = quantity + $2, price = $3, supplier_id = $4, updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(input.quantity)
        .bind(input.price)
        .bind(input.supplier_id)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| RepositoryError::from_write(e, "supplier does not exist or quantity out of range"))?;

        Ok(row.map(Into::into))
    }

    async fn delete_inventory(&self, id: InventoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM waterline.inventory WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(|e| RepositoryError::from_write(e, "inventory record has recorded sales"))?;

        Ok(result.rows_affected() > 0)
    }
}
