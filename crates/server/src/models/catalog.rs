//! Catalog entry types (sources, barangays, puroks, sheets, categories,
//! suppliers, items).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use waterline_core::{CatalogEntryId, CatalogKind};

/// A catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: CatalogEntryId,
    pub kind: CatalogKind,
    pub name: String,
    pub description: Option<String>,
    /// Barangay for puroks and sheets, category for items.
    pub parent_id: Option<CatalogEntryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a catalog entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<CatalogEntryId>,
}

/// Validated catalog entry ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCatalogEntry {
    pub kind: CatalogKind,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<CatalogEntryId>,
}
