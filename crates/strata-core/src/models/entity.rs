//! Routable entities: the items the router places into streams.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signals::Priority;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Task,
    Message,
    Contact,
    Deal,
}

impl ResourceType {
    pub const ALL: [ResourceType; 4] = [Self::Task, Self::Message, Self::Contact, Self::Deal];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Task => "TASK",
            Self::Message => "MESSAGE",
            Self::Contact => "CONTACT",
            Self::Deal => "DEAL",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
    }

    /// Type tag of the generic stream that collects this resource type when
    /// no role-specific stream fits.
    pub fn default_type_tag(&self) -> &'static str {
        match self {
            Self::Task => "tasks",
            Self::Message => "messages",
            Self::Contact => "contacts",
            Self::Deal => "deals",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub estimated_hours: Option<f64>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub sender: Option<String>,
    /// Ingestion channel, e.g. "email" or "chat".
    #[serde(default)]
    pub channel: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub stage: Option<String>,
    /// Win probability in [0, 1].
    #[serde(default)]
    pub probability: Option<f64>,
    #[serde(default)]
    pub expected_close_date: Option<DateTime<Utc>>,
}

/// Any item the router can place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "resourceType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Entity {
    Task(Task),
    Message(Message),
    Contact(Contact),
    Deal(Deal),
}

impl Entity {
    pub fn id(&self) -> &str {
        match self {
            Self::Task(t) => &t.id,
            Self::Message(m) => &m.id,
            Self::Contact(c) => &c.id,
            Self::Deal(d) => &d.id,
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::Task(_) => ResourceType::Task,
            Self::Message(_) => ResourceType::Message,
            Self::Contact(_) => ResourceType::Contact,
            Self::Deal(_) => ResourceType::Deal,
        }
    }

    /// Short human label used in reasoning strings and derived items.
    pub fn label(&self) -> &str {
        match self {
            Self::Task(t) => &t.title,
            Self::Message(m) => &m.subject,
            Self::Contact(c) => &c.name,
            Self::Deal(d) => &d.title,
        }
    }

    /// Free text fed to heuristics and embeddings.
    pub fn text(&self) -> String {
        let parts: Vec<&str> = match self {
            Self::Task(t) => vec![t.title.as_str(), t.description.as_deref().unwrap_or("")],
            Self::Message(m) => vec![m.subject.as_str(), m.body.as_str()],
            Self::Contact(c) => vec![
                c.name.as_str(),
                c.company.as_deref().unwrap_or(""),
                c.notes.as_deref().unwrap_or(""),
            ],
            Self::Deal(d) => vec![
                d.title.as_str(),
                d.description.as_deref().unwrap_or(""),
                d.stage.as_deref().unwrap_or(""),
            ],
        };
        parts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Field map consumed by rule conditions: the entity's camelCase fields
    /// plus `resourceType`.
    pub fn field_map(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }

    /// blake3 hash of the entity text; the embedding cache key.
    pub fn content_hash(&self) -> String {
        blake3::hash(self.text().as_bytes()).to_hex().to_string()
    }
}
