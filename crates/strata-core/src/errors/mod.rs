mod embedding_error;
mod storage_error;
mod strata_error;

pub use embedding_error::EmbeddingError;
pub use storage_error::StorageError;
pub use strata_error::{FieldViolation, StrataError};

/// Convenience alias used across the workspace.
pub type StrataResult<T> = Result<T, StrataError>;
