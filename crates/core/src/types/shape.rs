//! Map annotation enums.

use serde::{Deserialize, Serialize};

/// Operational status of a mapped asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(feature = "postgres", sqlx(type_name = "waterline.shape_status"))]
pub enum ShapeStatus {
    #[default]
    Active,
    #[serde(rename = "Non-Active")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "Non-Active"))]
    NonActive,
    Broken,
}

impl std::fmt::Display for ShapeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "Active"),
            Self::NonActive => write!(f, "Non-Active"),
            Self::Broken => write!(f, "Broken"),
        }
    }
}

/// Geometry tag recorded by the drawing tool.
///
/// Circles carry their radius outside the GeoJSON feature since GeoJSON has
/// no native circle geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "waterline.shape_kind", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Polyline,
    Polygon,
    Rectangle,
    Circle,
    Marker,
    #[serde(rename = "circlemarker")]
    CircleMarker,
}

impl ShapeKind {
    /// Whether the shape needs a radius to be drawn.
    #[must_use]
    pub const fn is_circular(self) -> bool {
        matches!(self, Self::Circle | Self::CircleMarker)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ShapeStatus::NonActive).unwrap(),
            "\"Non-Active\""
        );
        let parsed: ShapeStatus = serde_json::from_str("\"Broken\"").unwrap();
        assert_eq!(parsed, ShapeStatus::Broken);
        assert_eq!(ShapeStatus::NonActive.to_string(), "Non-Active");
    }

    #[test]
    fn test_kind_wire_names() {
        let parsed: ShapeKind = serde_json::from_str("\"circlemarker\"").unwrap();
        assert_eq!(parsed, ShapeKind::CircleMarker);
        assert!(serde_json::from_str::<ShapeKind>("\"hexagon\"").is_err());
    }

    #[test]
    fn test_circular_kinds() {
        assert!(ShapeKind::Circle.is_circular());
        assert!(ShapeKind::CircleMarker.is_circular());
        assert!(!ShapeKind::Polyline.is_circular());
    }
}
