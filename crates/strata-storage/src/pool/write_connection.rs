//! The single write connection. Writes are serialized through its mutex.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;

use strata_core::config::StorageConfig;
use strata_core::errors::{StrataError, StrataResult};

use super::pragmas::apply_pragmas;
use crate::to_storage_err;

pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &Path, config: &StorageConfig) -> StrataResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory(config: &StorageConfig) -> StrataResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        apply_pragmas(&conn, config)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the write lock and execute a closure with the connection.
    pub fn with_conn_sync<F, T>(&self, f: F) -> StrataResult<T>
    where
        F: FnOnce(&Connection) -> StrataResult<T>,
    {
        let guard = self
            .conn
            .lock()
            .map_err(|e| StrataError::ConcurrencyError(format!("write lock poisoned: {e}")))?;
        f(&guard)
    }
}
