//! One-time upgrade from the pre-list storage shape.

use records::AlumniRecord;
use tracing::{info, warn};

use crate::index::RecordIndex;

/// Loads the dashboard list, upgrading from the legacy flat shape when
/// needed.
///
/// Before the record list existed, a single submission was stored as a
/// bare form snapshot (plus an inline PDF payload under its own key). If
/// the list is empty but that snapshot exists, one record is synthesized
/// from it and persisted as the new list. The legacy PDF payload is not
/// migrated; the synthesized record's card reads as no longer available.
///
/// Load and save failures are logged and degrade to the prior state
/// rather than surfacing.
pub async fn load_dashboard(index: &dyn RecordIndex) -> Vec<AlumniRecord> {
    let list = match index.load_list().await {
        Ok(list) => list,
        Err(error) => {
            warn!("Failed to load record list: {error}");
            return Vec::new();
        }
    };

    if !list.is_empty() {
        return list;
    }

    let legacy = match index.load_last_form().await {
        Ok(form) => form,
        Err(error) => {
            warn!("Failed to read legacy snapshot: {error}");
            None
        }
    };

    let Some(form) = legacy else {
        return list;
    };

    info!("Upgrading legacy single-record storage to the record list");
    let record = AlumniRecord::from_submission(form);

    if let Err(error) = index.save_list(std::slice::from_ref(&record)).await {
        warn!("Failed to persist upgraded record list: {error}");
    }

    vec![record]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SqliteRecordIndex;
    use crate::{create_pool, run_migrations};
    use records::FormSubmission;

    async fn test_index(dir: &tempfile::TempDir) -> SqliteRecordIndex {
        let pool = create_pool(&dir.path().join("alumni.db")).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteRecordIndex::new(pool)
    }

    fn form(name: &str) -> FormSubmission {
        FormSubmission {
            full_name: name.to_owned(),
            student_number: "2123456".to_owned(),
            graduation_year: 2024,
            school: "University of the Philippines".to_owned(),
            program: "Bachelor of Science in Computer Science".to_owned(),
            mobile: "+639171234567".to_owned(),
            email: "juan@example.com".to_owned(),
            photo: "data:image/png;base64,aGVsbG8=".to_owned(),
            esig: "data:image/png;base64,aGVsbG8=".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_fresh_index_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let index = test_index(&dir).await;

        assert!(load_dashboard(&index).await.is_empty());
    }

    #[tokio::test]
    async fn test_legacy_snapshot_synthesizes_one_record() {
        let dir = tempfile::tempdir().unwrap();
        let index = test_index(&dir).await;
        index.save_last_form(&form("Legacy User")).await.unwrap();

        let list = load_dashboard(&index).await;
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].full_name, "Legacy User");
        // The legacy inline PDF is left behind on purpose.
        assert!(list[0].pdf_source.is_none());

        // The upgrade is persisted, so a reload sees the same single record.
        let reloaded = load_dashboard(&index).await;
        assert_eq!(reloaded, list);
    }

    #[tokio::test]
    async fn test_existing_list_wins_over_legacy_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let index = test_index(&dir).await;

        let existing = vec![AlumniRecord::from_submission(form("Listed User"))];
        index.save_list(&existing).await.unwrap();
        index.save_last_form(&form("Legacy User")).await.unwrap();

        assert_eq!(load_dashboard(&index).await, existing);
    }
}
