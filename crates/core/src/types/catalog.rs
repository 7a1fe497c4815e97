//! Organizational catalog kinds.
//!
//! Every directory-style entity the district tracks (water sources,
//! barangays, puroks, sheets, categories, suppliers and items) is stored
//! as a catalog entry tagged with its kind. Some kinds hang off a parent.

use serde::{Deserialize, Serialize};

/// Kind of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "waterline.catalog_kind", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Source,
    Barangay,
    Purok,
    Sheet,
    Category,
    Supplier,
    Item,
}

impl CatalogKind {
    /// All kinds, in display order.
    pub const ALL: [Self; 7] = [
        Self::Source,
        Self::Barangay,
        Self::Purok,
        Self::Sheet,
        Self::Category,
        Self::Supplier,
        Self::Item,
    ];

    /// The kind an entry's parent must have, if this kind takes a parent.
    ///
    /// Puroks and sheets belong to a barangay; items belong to a category.
    #[must_use]
    pub const fn parent_kind(self) -> Option<Self> {
        match self {
            Self::Purok | Self::Sheet => Some(Self::Barangay),
            Self::Item => Some(Self::Category),
            Self::Source | Self::Barangay | Self::Category | Self::Supplier => None,
        }
    }

    /// Singular name used in messages and audit records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Barangay => "barangay",
            Self::Purok => "purok",
            Self::Sheet => "sheet",
            Self::Category => "category",
            Self::Supplier => "supplier",
            Self::Item => "item",
        }
    }
}

impl std::fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CatalogKind {
    type Err = String;

    /// Accepts singular or plural path segments (`purok`, `puroks`, `categories`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        let singular = match lower.as_str() {
            "categories" => "category",
            other => other.strip_suffix('s').unwrap_or(other),
        };
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == singular)
            .ok_or_else(|| format!("unknown catalog kind: {s}"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_rules() {
        assert_eq!(CatalogKind::Purok.parent_kind(), Some(CatalogKind::Barangay));
        assert_eq!(CatalogKind::Sheet.parent_kind(), Some(CatalogKind::Barangay));
        assert_eq!(CatalogKind::Item.parent_kind(), Some(CatalogKind::Category));
        assert_eq!(CatalogKind::Supplier.parent_kind(), None);
        assert_eq!(CatalogKind::Source.parent_kind(), None);
    }

    #[test]
    fn test_parse_singular_and_plural() {
        assert_eq!("purok".parse::<CatalogKind>().unwrap(), CatalogKind::Purok);
        assert_eq!("puroks".parse::<CatalogKind>().unwrap(), CatalogKind::Purok);
        assert_eq!(
            "categories".parse::<CatalogKind>().unwrap(),
            CatalogKind::Category
        );
        assert_eq!(
            "Suppliers".parse::<CatalogKind>().unwrap(),
            CatalogKind::Supplier
        );
        assert!("pipes".parse::<CatalogKind>().is_err());
    }

    #[test]
    fn test_display_matches_serde() {
        for kind in CatalogKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{kind}\""));
        }
    }
}
