//! Versioned schema migrations, recorded in `schema_version`.

mod v001_stream_graph;
mod v002_rules;
mod v003_placements;
mod v004_vectors_routing;
mod v005_embedding_provider;

use rusqlite::Connection;

use strata_core::errors::{StorageError, StrataError, StrataResult};

use crate::to_storage_err;

type MigrationFn = fn(&Connection) -> StrataResult<()>;

const MIGRATIONS: &[(u32, MigrationFn)] = &[
    (1, v001_stream_graph::migrate),
    (2, v002_rules::migrate),
    (3, v003_placements::migrate),
    (4, v004_vectors_routing::migrate),
    (5, v005_embedding_provider::migrate),
];

/// Highest schema version this build knows about.
pub const LATEST_VERSION: u32 = 5;

/// Apply every migration newer than the recorded schema version.
pub fn run_migrations(conn: &Connection) -> StrataResult<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER PRIMARY KEY,
            applied_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    let current = current_version(conn)?;
    for (version, migrate) in MIGRATIONS {
        if *version <= current {
            continue;
        }
        migrate(conn).map_err(|e| {
            StrataError::StorageError(StorageError::MigrationFailed {
                version: *version,
                reason: e.to_string(),
            })
        })?;
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        tracing::info!(version = version, "applied migration");
    }
    current_version(conn)
}

/// Recorded schema version, 0 for a fresh database.
pub fn current_version(conn: &Connection) -> StrataResult<u32> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .map_err(|e| to_storage_err(e.to_string()))
}
