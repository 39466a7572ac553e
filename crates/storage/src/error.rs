//! Storage-layer error type.

use thiserror::Error;

/// Failure in either store.
///
/// Callers on the submission path treat these as best-effort: the failure
/// is logged and the prior persisted state stays in place.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("blob store error: {0}")]
    Blob(#[from] object_store::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt stored snapshot: {0}")]
    Corrupt(#[from] serde_json::Error),
}
