//! Streams: the containers that make up an organization's hierarchy.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type tags with structural meaning. Any other tag is free-form.
pub mod type_tags {
    pub const STREAM: &str = "STREAM";
    pub const CONTEXT: &str = "CONTEXT";
    pub const PROJECT: &str = "PROJECT";
    pub const AREA: &str = "AREA";

    /// Leaf tags only make sense underneath a matching container.
    pub const LEAF_TAGS: [&str; 3] = [CONTEXT, PROJECT, AREA];

    pub fn is_leaf(tag: &str) -> bool {
        LEAF_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Fixed structural role of a stream, used by routing and compliance checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamRole {
    Inbox,
    NextActions,
    WaitingFor,
    SomedayMaybe,
    Projects,
    Contexts,
    Areas,
    Reference,
    Custom,
}

impl StreamRole {
    pub const ALL: [StreamRole; 9] = [
        Self::Inbox,
        Self::NextActions,
        Self::WaitingFor,
        Self::SomedayMaybe,
        Self::Projects,
        Self::Contexts,
        Self::Areas,
        Self::Reference,
        Self::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbox => "INBOX",
            Self::NextActions => "NEXT_ACTIONS",
            Self::WaitingFor => "WAITING_FOR",
            Self::SomedayMaybe => "SOMEDAY_MAYBE",
            Self::Projects => "PROJECTS",
            Self::Contexts => "CONTEXTS",
            Self::Areas => "AREAS",
            Self::Reference => "REFERENCE",
            Self::Custom => "CUSTOM",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
    }

    /// Every role except CUSTOM carries structural rules.
    pub fn is_structural(&self) -> bool {
        !matches!(self, Self::Custom)
    }
}

impl fmt::Display for StreamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StreamStatus {
    #[default]
    Active,
    Frozen,
    Archived,
}

impl StreamStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Frozen => "FROZEN",
            Self::Archived => "ARCHIVED",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Some(Self::Active),
            "FROZEN" => Some(Self::Frozen),
            "ARCHIVED" => Some(Self::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node in the organizational hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    /// Free text indexed for similarity routing.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub role: Option<StreamRole>,
    pub type_tag: String,
    pub status: StreamStatus,
    /// Explicit configuration only. Inherited values are never stored here.
    pub config: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Stream {
    pub fn is_active(&self) -> bool {
        self.status == StreamStatus::Active
    }

    pub fn has_role(&self, role: StreamRole) -> bool {
        self.role == Some(role)
    }

    /// Text used for the similarity index: name plus description.
    pub fn index_text(&self) -> String {
        match &self.description {
            Some(d) if !d.trim().is_empty() => format!("{}. {}", self.name, d),
            _ => self.name.clone(),
        }
    }
}

/// Parameters for creating a stream.
#[derive(Debug, Clone)]
pub struct NewStream {
    pub organization_id: String,
    pub name: String,
    pub description: Option<String>,
    pub role: Option<StreamRole>,
    pub type_tag: String,
    pub config: serde_json::Value,
}

impl NewStream {
    pub fn new(organization_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            name: name.into(),
            description: None,
            role: None,
            type_tag: type_tags::STREAM.to_string(),
            config: serde_json::json!({}),
        }
    }

    pub fn with_role(mut self, role: StreamRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_type_tag(mut self, tag: impl Into<String>) -> Self {
        self.type_tag = tag.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }

    /// Materialize into a stream with a fresh id and timestamps.
    pub fn into_stream(self) -> Stream {
        let now = Utc::now();
        Stream {
            id: uuid::Uuid::new_v4().to_string(),
            organization_id: self.organization_id,
            name: self.name,
            description: self.description,
            role: self.role,
            type_tag: self.type_tag,
            status: StreamStatus::Active,
            config: self.config,
            created_at: now,
            updated_at: now,
        }
    }
}
