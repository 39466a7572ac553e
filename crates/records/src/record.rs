//! Persisted summary of one generated identity card.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::form::FormSubmission;

/// One generated identity card, as stored in the record index.
///
/// Records are created exactly once at successful submission and never
/// updated in place; an edit re-runs the submission flow and produces a
/// new record.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlumniRecord {
    /// Unique record id, generated at creation
    pub id: Uuid,

    /// Full name copied from the form
    pub full_name: String,

    /// School copied from the form
    pub school: String,

    /// Student number copied from the form
    pub student_number: String,

    /// Degree program copied from the form
    pub program: String,

    /// Graduation year copied from the form
    pub graduation_year: i32,

    /// Full form snapshot, sufficient to pre-fill an edit
    pub form_data: FormSubmission,

    /// Creation timestamp, set once
    pub created_at: DateTime<Utc>,

    /// Legacy inline PDF payload (remote URL or data URL) for records
    /// that predate the blob store; `None` when the PDF lives in the
    /// blob store under this record's id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_source: Option<String>,
}

impl AlumniRecord {
    /// Creates a fresh record from a submitted form.
    #[must_use]
    pub fn from_submission(form: FormSubmission) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: form.full_name.clone(),
            school: form.school.clone(),
            student_number: form.student_number.clone(),
            program: form.program.clone(),
            graduation_year: form.graduation_year,
            form_data: form,
            created_at: Utc::now(),
            pdf_source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormSubmission {
        FormSubmission {
            full_name: "Juan dela Cruz".to_owned(),
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

    #[test]
    fn test_from_submission_copies_scalars() {
        let record = AlumniRecord::from_submission(form());
        assert_eq!(record.full_name, "Juan dela Cruz");
        assert_eq!(record.school, "University of the Philippines");
        assert_eq!(record.graduation_year, 2024);
        assert_eq!(record.form_data, form());
        assert!(record.pdf_source.is_none());
    }

    #[test]
    fn test_fresh_records_get_distinct_ids() {
        let a = AlumniRecord::from_submission(form());
        let b = AlumniRecord::from_submission(form());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_serde_round_trip_keeps_camel_case_keys() {
        let record = AlumniRecord::from_submission(form());
        let json = serde_json::to_value(&record).unwrap();

        assert!(json.get("fullName").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("pdfSource").is_none());

        let back: AlumniRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
