use std::fmt;

use serde::{Deserialize, Serialize};

use super::{EmbeddingError, StorageError};

/// A single schema violation, addressed by its field path
/// (e.g. `notifications.enabled` or `conditions[0].value`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub path: String,
    pub reason: String,
}

impl FieldViolation {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Top-level error type for every Strata operation.
#[derive(Debug, thiserror::Error)]
pub enum StrataError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: String, id: String },

    #[error("cycle detected in stream hierarchy: {path}")]
    CycleDetected { path: String },

    #[error("validation failed: {}", join_violations(.violations))]
    ValidationError { violations: Vec<FieldViolation> },

    #[error("stream {id} still has {children} active children")]
    HasChildren { id: String, children: usize },

    #[error("external service unavailable: {service}: {reason}")]
    ExternalServiceUnavailable { service: String, reason: String },

    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("embedding error: {0}")]
    EmbeddingError(#[from] EmbeddingError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("concurrency error: {0}")]
    ConcurrencyError(String),

    #[error("unexpected failure: {context}")]
    Unknown { context: String },
}

impl StrataError {
    pub fn not_found(kind: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: kind.to_string(),
            id: id.into(),
        }
    }

    /// Single-field validation failure.
    pub fn invalid(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationError {
            violations: vec![FieldViolation::new(path, reason)],
        }
    }

    /// Field paths carried by a `ValidationError`; empty for every other variant.
    pub fn field_paths(&self) -> Vec<&str> {
        match self {
            Self::ValidationError { violations } => {
                violations.iter().map(|v| v.path.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Structural invariant violations. Retrying the same request fails identically.
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::CycleDetected { .. } | Self::HasChildren { .. })
    }

    /// Failures of an external dependency that callers may degrade around.
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            Self::ExternalServiceUnavailable { .. } | Self::EmbeddingError(_)
        )
    }
}
