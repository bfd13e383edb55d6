//! Records written by rule actions: where an entity was placed, and items
//! derived from it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::ResourceType;
use super::signals::{Context, Priority};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub entity_id: String,
    pub resource_type: ResourceType,
    pub stream_id: Option<String>,
    pub context: Option<Context>,
    pub priority: Option<Priority>,
    pub updated_at: DateTime<Utc>,
}

impl Placement {
    pub fn empty(entity_id: &str, resource_type: ResourceType) -> Self {
        Self {
            entity_id: entity_id.to_string(),
            resource_type,
            stream_id: None,
            context: None,
            priority: None,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DerivedKind {
    Task,
    Project,
}

impl DerivedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "TASK",
            Self::Project => "PROJECT",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "TASK" => Some(Self::Task),
            "PROJECT" => Some(Self::Project),
            _ => None,
        }
    }
}

impl fmt::Display for DerivedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task or project created by a rule action from a source entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedEntity {
    pub id: String,
    pub kind: DerivedKind,
    pub source_entity_id: String,
    pub stream_id: Option<String>,
    pub title: String,
    pub created_at: DateTime<Utc>,
}
