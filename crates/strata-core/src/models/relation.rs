//! Relations: directed, typed, soft-deletable parent→child edges.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    #[default]
    Owns,
    Manages,
    BelongsTo,
    RelatedTo,
    DependsOn,
    Supports,
}

impl RelationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owns => "OWNS",
            Self::Manages => "MANAGES",
            Self::BelongsTo => "BELONGS_TO",
            Self::RelatedTo => "RELATED_TO",
            Self::DependsOn => "DEPENDS_ON",
            Self::Supports => "SUPPORTS",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "OWNS" => Some(Self::Owns),
            "MANAGES" => Some(Self::Manages),
            "BELONGS_TO" => Some(Self::BelongsTo),
            "RELATED_TO" => Some(Self::RelatedTo),
            "DEPENDS_ON" => Some(Self::DependsOn),
            "SUPPORTS" => Some(Self::Supports),
            _ => None,
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How configuration flows along an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InheritanceRule {
    NoInheritance,
    #[default]
    InheritDown,
    InheritUp,
    Bidirectional,
}

impl InheritanceRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoInheritance => "NO_INHERITANCE",
            Self::InheritDown => "INHERIT_DOWN",
            Self::InheritUp => "INHERIT_UP",
            Self::Bidirectional => "BIDIRECTIONAL",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        match s {
            "NO_INHERITANCE" => Some(Self::NoInheritance),
            "INHERIT_DOWN" => Some(Self::InheritDown),
            "INHERIT_UP" => Some(Self::InheritUp),
            "BIDIRECTIONAL" => Some(Self::Bidirectional),
            _ => None,
        }
    }

    /// Whether a child inherits the parent's configuration across this edge.
    pub fn carries_down(&self) -> bool {
        matches!(self, Self::InheritDown | Self::Bidirectional)
    }
}

/// A directed edge between two streams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub id: String,
    pub parent_id: String,
    pub child_id: String,
    pub relation_type: RelationType,
    pub inheritance: InheritanceRule,
    pub active: bool,
    #[serde(default)]
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl Relation {
    /// A fresh active edge with default type (OWNS) and inheritance (INHERIT_DOWN).
    pub fn new(parent_id: &str, child_id: &str, actor: &str) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            parent_id: parent_id.to_string(),
            child_id: child_id.to_string(),
            relation_type: RelationType::default(),
            inheritance: InheritanceRule::default(),
            active: true,
            created_by: Some(actor.to_string()),
            created_at: Utc::now(),
            deactivated_at: None,
        }
    }

    pub fn with_type(mut self, relation_type: RelationType) -> Self {
        self.relation_type = relation_type;
        self
    }

    pub fn with_inheritance(mut self, inheritance: InheritanceRule) -> Self {
        self.inheritance = inheritance;
        self
    }
}

/// Access control attached to a relation: what an inheriting node may see or
/// do with data flowing along the edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub data_scope: String,
    pub action: String,
    pub granted: bool,
}
