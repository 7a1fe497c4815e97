//! Business logic.
//!
//! Every operation takes a [`RequestContext`] naming the caller and their
//! role, validates its input before touching storage, and returns
//! [`ServiceError`]. Services hold borrowed store handles and are cheap to
//! build per request.

pub mod audit;
pub mod catalog;
mod error;
pub mod inventory;
pub mod messaging;
pub mod notes;
pub mod sales;
pub mod shapes;
pub mod users;

pub use audit::{AuditLog, AuditService};
pub use catalog::CatalogService;
pub use error::ServiceError;
pub use inventory::InventoryService;
pub use messaging::{MessageHub, MessagingService};
pub use notes::NoteService;
pub use sales::SalesService;
pub use shapes::ShapeService;
pub use users::UserService;

use rust_decimal::Decimal;

use crate::models::RequestContext;

/// Largest price a `NUMERIC(12, 2)` column holds: 9,999,999,999.99.
pub const MAX_PRICE: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

pub(crate) const fn require_admin(ctx: &RequestContext) -> Result<(), ServiceError> {
    if ctx.role.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

pub(crate) const fn require_map_editor(ctx: &RequestContext) -> Result<(), ServiceError> {
    if ctx.role.can_edit_map() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

/// Trim `value` and reject it if nothing is left.
pub(crate) fn non_empty(value: &str, field: &str) -> Result<String, ServiceError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Reject amounts with more than two decimal places or above [`MAX_PRICE`].
///
/// Accepted amounts are stored exactly, without rounding.
pub(crate) fn check_money(value: Decimal, field: &str) -> Result<(), ServiceError> {
    if value.normalize().scale() > 2 {
        return Err(ServiceError::validation(format!(
            "{field} must have at most two decimal places"
        )));
    }
    if value.abs() > MAX_PRICE {
        return Err(ServiceError::validation(format!(
            "{field} must not exceed {MAX_PRICE}"
        )));
    }
    Ok(())
}

/// Trim an optional text field, mapping blank to `None`.
pub(crate) fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_price_is_largest_storable_amount() {
        assert_eq!(MAX_PRICE, Decimal::new(999_999_999_999, 2));
    }

    #[test]
    fn test_check_money() {
        assert!(check_money(MAX_PRICE, "price").is_ok());
        assert!(check_money(Decimal::new(5010, 3), "price").is_ok());
        assert!(check_money(Decimal::new(5005, 3), "price").is_err());
        assert!(check_money(MAX_PRICE + Decimal::new(1, 2), "price").is_err());
        assert!(check_money(Decimal::MAX, "price").is_err());
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared fixtures for service tests.

    #![allow(clippy::unwrap_used)]

    use async_trait::async_trait;
    use rust_decimal::Decimal;

    use waterline_core::{CatalogEntryId, CatalogKind, UserId, UserRole};

    use crate::db::RepositoryError;
    use crate::models::{
        CreateInventoryInput, InventoryRecord, NewAuditEntry, NewCatalogEntry, RequestContext,
    };
    use crate::store::{AuditSink, CatalogStore, InventoryStore};
    use crate::store::memory::InMemoryStore;

    pub const ADMIN: RequestContext = RequestContext::new(UserId::new(1), UserRole::Admin);
    pub const ENGR: RequestContext = RequestContext::new(UserId::new(2), UserRole::Engr);
    pub const VIEWER: RequestContext = RequestContext::new(UserId::new(3), UserRole::User);

    /// Audit sink that always fails.
    pub struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn append_audit_entry(&self, _: &NewAuditEntry) -> Result<(), RepositoryError> {
            Err(RepositoryError::DataCorruption("audit sink offline".into()))
        }
    }

    /// Seed a category, an item, a supplier and one inventory record.
    pub async fn seed_stock(store: &InMemoryStore, quantity: i32, price: Decimal) -> InventoryRecord {
        fn entry(kind: CatalogKind, name: &str, parent_id: Option<CatalogEntryId>) -> NewCatalogEntry {
            NewCatalogEntry {
                kind,
                name: name.to_string(),
                description: None,
                parent_id,
            }
        }

        let category = store
            .insert_catalog_entry(&entry(CatalogKind::Category, "Pipes", None))
            .await
            .unwrap();
        let item = store
            .insert_catalog_entry(&entry(CatalogKind::Item, "PVC 2in", Some(category.id)))
            .await
            .unwrap();
        let supplier = store
            .insert_catalog_entry(&entry(CatalogKind::Supplier, "Acme Pipes", None))
            .await
            .unwrap();
        store
            .insert_inventory(&CreateInventoryInput {
                item_id: item.id,
                supplier_id: supplier.id,
                quantity,
                price,
            })
            .await
            .unwrap()
    }
}
