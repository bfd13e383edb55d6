use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hierarchy mutations recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOperation {
    Create,
    Attach,
    Detach,
    Move,
    Freeze,
    Unfreeze,
    Archive,
    Delete,
    ConfigUpdate,
}

impl AuditOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Attach => "attach",
            Self::Detach => "detach",
            Self::Move => "move",
            Self::Freeze => "freeze",
            Self::Unfreeze => "unfreeze",
            Self::Archive => "archive",
            Self::Delete => "delete",
            Self::ConfigUpdate => "config_update",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Self::Create),
            "attach" => Some(Self::Attach),
            "detach" => Some(Self::Detach),
            "move" => Some(Self::Move),
            "freeze" => Some(Self::Freeze),
            "unfreeze" => Some(Self::Unfreeze),
            "archive" => Some(Self::Archive),
            "delete" => Some(Self::Delete),
            "config_update" => Some(Self::ConfigUpdate),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub stream_id: String,
    pub operation: AuditOperation,
    pub actor: String,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}
