//! Audit log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use waterline_core::{AuditEntryId, UserId};

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Restock,
    Sell,
    AppendLog,
    Login,
}

impl AuditAction {
    /// Stored text form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Restock => "restock",
            Self::Sell => "sell",
            Self::AppendLog => "append_log",
            Self::Login => "login",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "restock" => Ok(Self::Restock),
            "sell" => Ok(Self::Sell),
            "append_log" => Ok(Self::AppendLog),
            "login" => Ok(Self::Login),
            other => Err(format!("unknown audit action: {other}")),
        }
    }
}

/// A stored audit record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEntry {
    pub id: AuditEntryId,
    pub user_id: Option<UserId>,
    pub action: AuditAction,
    pub entity: String,
    pub entity_id: Option<i32>,
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// An audit record waiting to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditEntry {
    pub user_id: Option<UserId>,
    pub action: AuditAction,
    pub entity: String,
    pub entity_id: Option<i32>,
    pub detail: Option<String>,
}

impl NewAuditEntry {
    /// Start an entry for `action` on `entity`.
    #[must_use]
    pub fn new(user_id: UserId, action: AuditAction, entity: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id),
            action,
            entity: entity.into(),
            entity_id: None,
            detail: None,
        }
    }

    /// Attach the affected row id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<i32>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Attach a short free-text detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_action_text_roundtrip() {
        for action in [
            AuditAction::Create,
            AuditAction::Update,
            AuditAction::Delete,
            AuditAction::Restock,
            AuditAction::Sell,
            AuditAction::AppendLog,
            AuditAction::Login,
        ] {
            assert_eq!(action.as_str().parse::<AuditAction>().unwrap(), action);
        }
    }

    #[test]
    fn test_builder() {
        let entry = NewAuditEntry::new(UserId::new(1), AuditAction::Sell, "sale")
            .with_id(waterline_core::SaleId::new(5))
            .with_detail("3 units");
        assert_eq!(entry.entity, "sale");
        assert_eq!(entry.entity_id, Some(5));
        assert_eq!(entry.detail.as_deref(), Some("3 units"));
    }
}
