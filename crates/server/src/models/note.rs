//! Field note types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use waterline_core::{NoteId, UserId};

/// A note pinned to a map location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub body: String,
    pub latitude: f64,
    pub longitude: f64,
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing a note.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NoteInput {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub latitude: f64,
    pub longitude: f64,
}
