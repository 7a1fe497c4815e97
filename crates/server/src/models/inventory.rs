//! Inventory record types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use waterline_core::{CatalogEntryId, InventoryId};

/// A stocked item at a supplier, with its current quantity and unit price.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryRecord {
    pub id: InventoryId,
    /// Catalog entry of kind `item`.
    pub item_id: CatalogEntryId,
    /// Catalog entry of kind `supplier`.
    pub supplier_id: CatalogEntryId,
    /// Units on hand. Never negative.
    pub quantity: i32,
    /// Current unit price.
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryRecord {
    /// Stock value: `quantity × price`, or `None` if it overflows.
    #[must_use]
    pub fn amount(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.price)
    }
}

/// Input for creating an inventory record.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInventoryInput {
    pub item_id: CatalogEntryId,
    pub supplier_id: CatalogEntryId,
    pub quantity: i32,
    pub price: Decimal,
}

/// Input for updating an inventory record.
///
/// `quantity` is a restock delta: it is ADDED to the stored quantity.
/// `price` and `supplier_id` replace the stored values.
#[derive(Debug, Clone, Deserialize)]
pub struct RestockInput {
    pub quantity: i32,
    pub price: Decimal,
    pub supplier_id: CatalogEntryId,
}

/// Filter criteria for listing inventory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InventoryFilter {
    pub item_id: Option<CatalogEntryId>,
    pub supplier_id: Option<CatalogEntryId>,
}
