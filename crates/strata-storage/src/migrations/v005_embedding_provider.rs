//! v005: record which provider produced each stream embedding.

use rusqlite::Connection;

use strata_core::errors::StrataResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> StrataResult<()> {
    conn.execute_batch(
        "
        ALTER TABLE stream_embeddings ADD COLUMN provider TEXT NOT NULL DEFAULT '';
        CREATE INDEX IF NOT EXISTS idx_embeddings_org_provider
            ON stream_embeddings(organization_id, provider);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
