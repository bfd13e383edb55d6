//! Connection pool managing read/write connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use strata_core::config::StorageConfig;
use strata_core::errors::StrataResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// One write connection plus a pool of read connections.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    pub readers: ReadPool,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a connection pool for the given database file.
    pub fn open(path: &Path, config: &StorageConfig) -> StrataResult<Self> {
        let writer = WriteConnection::open(path, config)?;
        let readers = ReadPool::open(path, config.read_pool_size, config.busy_timeout_ms)?;
        Ok(Self {
            writer,
            readers,
            db_path: Some(path.to_path_buf()),
        })
    }

    /// In-memory pool. Readers are isolated databases here, so callers must
    /// route reads through the writer.
    pub fn open_in_memory(config: &StorageConfig) -> StrataResult<Self> {
        let writer = WriteConnection::open_in_memory(config)?;
        let readers = ReadPool::open_in_memory(1, config.busy_timeout_ms)?;
        Ok(Self {
            writer,
            readers,
            db_path: None,
        })
    }
}
