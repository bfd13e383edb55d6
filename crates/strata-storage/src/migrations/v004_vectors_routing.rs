//! v004: stream_embeddings, routing_log.

use rusqlite::Connection;

use strata_core::errors::StrataResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StrataResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS stream_embeddings (
            stream_id        TEXT PRIMARY KEY,
            organization_id  TEXT NOT NULL,
            content_hash     TEXT NOT NULL,
            embedding        BLOB NOT NULL,
            dimensions       INTEGER NOT NULL,
            updated_at       TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            FOREIGN KEY (stream_id) REFERENCES streams(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_embeddings_org ON stream_embeddings(organization_id);

        CREATE TABLE IF NOT EXISTS routing_log (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            organization_id   TEXT NOT NULL,
            entity_id         TEXT NOT NULL,
            target_stream_id  TEXT NOT NULL,
            stage             TEXT NOT NULL,
            confidence        REAL NOT NULL,
            fallback_used     INTEGER NOT NULL,
            result            TEXT NOT NULL,
            routed_at         TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        );

        CREATE INDEX IF NOT EXISTS idx_routing_entity ON routing_log(entity_id);
        CREATE INDEX IF NOT EXISTS idx_routing_org ON routing_log(organization_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
