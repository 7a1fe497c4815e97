//! Sale types and profit computation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use waterline_core::{CatalogEntryId, InventoryId, SaleId, UserId};

/// An immutable record of units sold from an inventory record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sale {
    pub id: SaleId,
    pub inventory_id: InventoryId,
    pub item_id: CatalogEntryId,
    pub quantity_sold: i32,
    pub selling_price: Decimal,
    /// Inventory unit price at the moment of sale.
    pub unit_cost: Decimal,
    /// `(selling_price - unit_cost) × quantity_sold`, fixed at creation.
    pub profit: Decimal,
    pub sold_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Input for recording a sale.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSaleInput {
    pub inventory_id: InventoryId,
    pub quantity_sold: i32,
    pub selling_price: Decimal,
}

/// Validated sale handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSale {
    pub inventory_id: InventoryId,
    pub quantity_sold: i32,
    pub selling_price: Decimal,
    pub sold_by: UserId,
}

/// Result of an attempt to record a sale.
///
/// The store decides stock availability under the same lock that performs
/// the decrement, so the check and the write cannot interleave with another
/// sale against the same record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaleOutcome {
    /// Stock was decremented and the sale inserted.
    Recorded {
        sale: Sale,
        /// Inventory quantity after the decrement.
        remaining: i32,
    },
    /// The referenced inventory record does not exist.
    InventoryMissing,
    /// Requested quantity exceeds what is on hand. Nothing was written.
    InsufficientStock { available: i32 },
}

/// Filter criteria for listing sales.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleFilter {
    pub inventory_id: Option<InventoryId>,
}

/// Profit of a sale: `(selling_price - unit_cost) × quantity`.
///
/// `None` when the result does not fit in a `Decimal`.
#[must_use]
pub fn compute_profit(
    selling_price: Decimal,
    unit_cost: Decimal,
    quantity: i32,
) -> Option<Decimal> {
    selling_price
        .checked_sub(unit_cost)?
        .checked_mul(Decimal::from(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profit_example() {
        // 3 units bought at 5.00, sold at 8.00
        let profit = compute_profit(Decimal::new(800, 2), Decimal::new(500, 2), 3);
        assert_eq!(profit, Some(Decimal::new(900, 2)));
    }

    #[test]
    fn test_profit_can_be_negative() {
        let profit = compute_profit(Decimal::new(400, 2), Decimal::new(500, 2), 2);
        assert_eq!(profit, Some(Decimal::new(-200, 2)));
    }

    #[test]
    fn test_profit_overflow_is_none() {
        assert_eq!(compute_profit(Decimal::MAX, Decimal::ZERO, 2), None);
        assert_eq!(compute_profit(Decimal::MIN, Decimal::MAX, 1), None);
    }
}
