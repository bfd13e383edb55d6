//! PRAGMA configuration applied to every SQLite connection.

use rusqlite::Connection;

use strata_core::config::StorageConfig;
use strata_core::errors::StrataResult;

use crate::to_storage_err;

/// Pragmas for the write connection: WAL (when enabled), NORMAL sync,
/// busy timeout, foreign keys.
pub fn apply_pragmas(conn: &Connection, config: &StorageConfig) -> StrataResult<()> {
    if config.wal_mode {
        conn.execute_batch("PRAGMA journal_mode = WAL;")
            .map_err(|e| to_storage_err(e.to_string()))?;
    }
    conn.execute_batch(&format!(
        "
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = {};
        PRAGMA foreign_keys = ON;
        ",
        config.busy_timeout_ms
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Pragmas for read connections.
pub fn apply_read_pragmas(conn: &Connection, busy_timeout_ms: u32) -> StrataResult<()> {
    conn.execute_batch(&format!(
        "
        PRAGMA busy_timeout = {busy_timeout_ms};
        PRAGMA foreign_keys = ON;
        "
    ))
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Whether WAL mode is active on a connection.
pub fn verify_wal_mode(conn: &Connection) -> StrataResult<bool> {
    let mode: String = conn
        .pragma_query_value(None, "journal_mode", |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(mode.eq_ignore_ascii_case("wal"))
}
