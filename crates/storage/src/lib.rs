//! Local persistence for generated identity cards.
//!
//! Two stores behind explicit interfaces: [`RecordIndex`] holds the ordered
//! record list and form snapshots as JSON key-value entries in SQLite, and
//! [`BlobStore`] holds PDF payloads in a filesystem object store. Either
//! backing can be swapped without touching the submission flow.

use std::path::Path;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

mod blobs;
mod error;
mod index;
mod migration;

pub use blobs::{BlobStore, FsBlobStore, resolve_pdf};
pub use error::StorageError;
pub use index::{RecordIndex, SqliteRecordIndex};
pub use migration::load_dashboard;

/// Creates a connection pool to the embedded `SQLite` database, creating
/// the file if it does not exist.
///
/// # Errors
///
/// Returns an error if the connection to the database fails.
pub async fn create_pool(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Runs all pending migrations.
///
/// # Errors
///
/// Returns an error if running migrations fails.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
