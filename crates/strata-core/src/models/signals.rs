//! Classification signals shared by the router and rule actions.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::Low, Self::Medium, Self::High, Self::Urgent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where or how an item can be acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Context {
    #[default]
    Computer,
    Phone,
    Office,
    Home,
    Errands,
    Reading,
    Waiting,
}

impl Context {
    pub const ALL: [Context; 7] = [
        Self::Computer,
        Self::Phone,
        Self::Office,
        Self::Home,
        Self::Errands,
        Self::Reading,
        Self::Waiting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Computer => "COMPUTER",
            Self::Phone => "PHONE",
            Self::Office => "OFFICE",
            Self::Home => "HOME",
            Self::Errands => "ERRANDS",
            Self::Reading => "READING",
            Self::Waiting => "WAITING",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnergyLevel {
    Creative,
    Administrative,
    High,
    Low,
    #[default]
    Medium,
}

impl EnergyLevel {
    pub const ALL: [EnergyLevel; 5] = [
        Self::Creative,
        Self::Administrative,
        Self::High,
        Self::Low,
        Self::Medium,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creative => "CREATIVE",
            Self::Administrative => "ADMINISTRATIVE",
            Self::High => "HIGH",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
        }
    }

    pub fn from_str_name(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
