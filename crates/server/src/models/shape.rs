//! Map shape and pipe log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use waterline_core::{PipeLogId, ShapeId, ShapeKind, ShapeStatus, UserId};

/// Stroke color used when the client does not pick one.
pub const DEFAULT_SHAPE_COLOR: &str = "#3388ff";

/// A persisted map annotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MapShape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    /// GeoJSON feature, stored as received.
    pub geojson: serde_json::Value,
    /// Radius in meters for circular shapes.
    pub radius: Option<f64>,
    pub title: String,
    pub description: Option<String>,
    pub status: ShapeStatus,
    pub color: String,
    /// Current pipe size. The history lives in [`PipeLog`].
    pub size: Option<String>,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or wholesale-replacing a shape.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ShapeInput {
    pub kind: ShapeKind,
    pub geojson: serde_json::Value,
    #[serde(default)]
    pub radius: Option<f64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: ShapeStatus,
    #[serde(default = "default_color")]
    pub color: String,
    /// Initial pipe size. Ignored on update: sizes change only through a
    /// pipe log append.
    #[serde(default)]
    pub size: Option<String>,
}

fn default_color() -> String {
    DEFAULT_SHAPE_COLOR.to_string()
}

/// Append-only size history entry for a shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PipeLog {
    pub id: PipeLogId,
    pub shape_id: ShapeId,
    pub size: String,
    pub remarks: Option<String>,
    pub logged_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Input for appending a pipe log.
#[derive(Debug, Clone, Deserialize)]
pub struct AppendPipeLogInput {
    pub size: String,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Validated pipe log handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPipeLog {
    pub size: String,
    pub remarks: Option<String>,
    pub logged_by: UserId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_input_defaults() {
        let input: ShapeInput = serde_json::from_value(serde_json::json!({
            "kind": "polyline",
            "geojson": {"type": "Feature", "geometry": null, "properties": {}},
            "title": "Main line"
        }))
        .unwrap();

        assert_eq!(input.status, ShapeStatus::Active);
        assert_eq!(input.color, DEFAULT_SHAPE_COLOR);
        assert_eq!(input.radius, None);
        assert_eq!(input.size, None);
    }
}
