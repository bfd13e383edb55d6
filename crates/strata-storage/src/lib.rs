//! # strata-storage
//!
//! SQLite persistence for streams, relations, permissions, rules, placements,
//! stream embeddings, the routing log, and the hierarchy audit log.

pub mod engine;
pub mod migrations;
pub mod pool;
pub mod queries;

pub use engine::StorageEngine;

use strata_core::errors::{StorageError, StrataError};

/// Wrap a SQLite failure message as a `StrataError`.
pub fn to_storage_err(message: String) -> StrataError {
    StrataError::StorageError(StorageError::SqliteError { message })
}
