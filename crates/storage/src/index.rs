//! Record index: the ordered list of generated cards and form snapshots.

use async_trait::async_trait;
use records::{AlumniRecord, FormSubmission};
use sqlx::SqlitePool;

use crate::error::StorageError;

/// Key holding the ordered record list, newest first.
const LIST_KEY: &str = "alumni_id_list";

/// Key holding the last submitted form snapshot. Before the list existed
/// this key was the only record storage, which is what the legacy
/// migration reads.
const FORM_KEY: &str = "alumni_form_data";

/// Ordered index of generated cards plus the last-form snapshot.
///
/// List operations use whole-snapshot semantics: `save_list` replaces the
/// stored list with exactly the sequence given, and concurrent writers
/// race with last-write-wins. Insertion order (newest first) is the only
/// ordering the index maintains.
#[async_trait]
pub trait RecordIndex: Send + Sync {
    /// Loads the full record list, newest first. An index that has never
    /// been written reads as empty.
    async fn load_list(&self) -> Result<Vec<AlumniRecord>, StorageError>;

    /// Replaces the stored list with `records`.
    async fn save_list(&self, records: &[AlumniRecord]) -> Result<(), StorageError>;

    /// Loads the last submitted form snapshot, if any.
    async fn load_last_form(&self) -> Result<Option<FormSubmission>, StorageError>;

    /// Replaces the last submitted form snapshot.
    async fn save_last_form(&self, form: &FormSubmission) -> Result<(), StorageError>;
}

/// [`RecordIndex`] backed by the embedded SQLite key-value table.
#[derive(Debug, Clone)]
pub struct SqliteRecordIndex {
    pool: SqlitePool,
}

impl SqliteRecordIndex {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_entries WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RecordIndex for SqliteRecordIndex {
    async fn load_list(&self) -> Result<Vec<AlumniRecord>, StorageError> {
        match self.get(LIST_KEY).await? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    async fn save_list(&self, records: &[AlumniRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_string(records)?;
        self.put(LIST_KEY, &json).await
    }

    async fn load_last_form(&self) -> Result<Option<FormSubmission>, StorageError> {
        match self.get(FORM_KEY).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn save_last_form(&self, form: &FormSubmission) -> Result<(), StorageError> {
        let json = serde_json::to_string(form)?;
        self.put(FORM_KEY, &json).await
    }
}
