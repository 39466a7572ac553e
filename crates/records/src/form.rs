//! Submitted form payload and the validation rules applied before submission.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Maximum decoded size of the 1x1 photo payload.
const MAX_PHOTO_SIZE_BYTES: usize = 1024 * 1024;

/// Maximum decoded size of the e-signature payload.
const MAX_ESIG_SIZE_BYTES: usize = 500 * 1024;

/// One submitted alumni form.
///
/// Field names serialize in the camelCase form the webhook expects.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    /// Full name of the alumnus
    pub full_name: String,

    /// Student number (digits only)
    pub student_number: String,

    /// Graduation year
    pub graduation_year: i32,

    /// School / university name
    pub school: String,

    /// Degree program
    pub program: String,

    /// Mobile number in canonical +639XXXXXXXXX form
    pub mobile: String,

    /// Email address
    pub email: String,

    /// 1x1 photo as a data URL
    pub photo: String,

    /// E-signature as a data URL
    pub esig: String,
}

impl FormSubmission {
    /// Returns a copy with whitespace trimmed and the mobile number
    /// normalized to the canonical `+639XXXXXXXXX` form.
    #[must_use]
    pub fn canonicalized(&self) -> Self {
        Self {
            full_name: self.full_name.trim().to_owned(),
            student_number: self.student_number.trim().to_owned(),
            graduation_year: self.graduation_year,
            school: self.school.trim().to_owned(),
            program: self.program.trim().to_owned(),
            mobile: canonical_ph_mobile(&self.mobile),
            email: self.email.trim().to_owned(),
            photo: self.photo.clone(),
            esig: self.esig.clone(),
        }
    }

    /// Validates all fields, collecting every failure.
    ///
    /// # Errors
    ///
    /// Returns the full set of per-field messages when any rule fails.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        let full_name = self.full_name.trim();
        if full_name.is_empty() {
            errors.push(FieldError::new("fullName", "Full name is required."));
        } else if full_name.chars().any(|c| c.is_ascii_digit()) {
            errors.push(FieldError::new(
                "fullName",
                "Full name must not contain numbers.",
            ));
        }

        let student_number = self.student_number.trim();
        if student_number.is_empty() {
            errors.push(FieldError::new(
                "studentNumber",
                "Student number is required.",
            ));
        } else if student_number.chars().any(|c| c.is_ascii_alphabetic()) {
            errors.push(FieldError::new(
                "studentNumber",
                "Student number must not contain letters.",
            ));
        }

        if !(1900..=2100).contains(&self.graduation_year) {
            errors.push(FieldError::new(
                "graduationYear",
                "Graduation year must be between 1900 and 2100.",
            ));
        }

        if self.school.trim().is_empty() {
            errors.push(FieldError::new("school", "School is required."));
        }
        if self.program.trim().is_empty() {
            errors.push(FieldError::new("program", "Program is required."));
        }

        let mobile = normalize_ph_mobile(&self.mobile);
        if mobile.is_empty() {
            errors.push(FieldError::new("mobile", "Mobile number is required."));
        } else if !is_valid_ph_mobile(&mobile) {
            errors.push(FieldError::new(
                "mobile",
                "Enter a valid PH number (e.g., 9XX XXX XXXX).",
            ));
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(FieldError::new("email", "Email is required."));
        } else if !is_plausible_email(email) {
            errors.push(FieldError::new("email", "Enter a valid email address."));
        }

        if self.photo.is_empty() {
            errors.push(FieldError::new("photo", "Photo is required."));
        } else if data_url_decoded_len(&self.photo).is_some_and(|n| n > MAX_PHOTO_SIZE_BYTES) {
            errors.push(FieldError::new("photo", "Photo must be 1 MB or smaller."));
        }

        if self.esig.is_empty() {
            errors.push(FieldError::new("esig", "E-signature is required."));
        } else if data_url_decoded_len(&self.esig).is_some_and(|n| n > MAX_ESIG_SIZE_BYTES) {
            errors.push(FieldError::new(
                "esig",
                "E-signature must be 500 KB or smaller.",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors { fields: errors })
        }
    }
}

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Form field the rule applies to (camelCase wire name)
    pub field: &'static str,

    /// User-facing message
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        Self {
            field,
            message: message.to_owned(),
        }
    }
}

/// All validation failures for one form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    /// Per-field failures, in field order
    pub fields: Vec<FieldError>,
}

impl std::error::Error for ValidationErrors {}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

/// Strips a PH mobile number down to its bare `9XXXXXXXXX` form.
///
/// Accepts `+639XXXXXXXXX`, `639XXXXXXXXX`, `09XXXXXXXXX`, or the bare
/// ten-digit form. Returns whatever digits remain when the input matches
/// none of those shapes.
#[must_use]
pub fn normalize_ph_mobile(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return digits;
    }
    if digits.starts_with("63") && digits.len() >= 12 {
        return digits[2..].to_owned();
    }
    if digits.starts_with('0') && digits.len() >= 11 {
        return digits[1..].to_owned();
    }
    digits
}

/// Checks the bare form: ten digits starting with 9.
#[must_use]
pub fn is_valid_ph_mobile(bare: &str) -> bool {
    bare.len() == 10 && bare.starts_with('9') && bare.chars().all(|c| c.is_ascii_digit())
}

/// Canonical stored form: `+63` followed by the bare number.
#[must_use]
pub fn canonical_ph_mobile(input: &str) -> String {
    let bare = normalize_ph_mobile(input);
    if bare.is_empty() {
        bare
    } else {
        format!("+63{bare}")
    }
}

/// Light shape check matching the form-level rule: `local@domain.tld`
/// with no whitespace on either side of the `@`.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
}

/// Decoded size of a data URL's base64 payload, without decoding it.
///
/// Returns `None` when the input is not a base64 data URL.
fn data_url_decoded_len(data_url: &str) -> Option<usize> {
    let (header, payload) = data_url.split_once(',')?;
    if !header.starts_with("data:") || !header.ends_with("base64") {
        return None;
    }
    let padding = payload.chars().rev().take_while(|&c| c == '=').count();
    Some((payload.len() * 3 / 4).saturating_sub(padding))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> FormSubmission {
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
    fn test_normalize_ph_mobile() {
        assert_eq!(normalize_ph_mobile("+639171234567"), "9171234567");
        assert_eq!(normalize_ph_mobile("639171234567"), "9171234567");
        assert_eq!(normalize_ph_mobile("09171234567"), "9171234567");
        assert_eq!(normalize_ph_mobile("9171234567"), "9171234567");
        assert_eq!(normalize_ph_mobile("917 123 4567"), "9171234567");
        assert_eq!(normalize_ph_mobile(""), "");
    }

    #[test]
    fn test_canonical_ph_mobile() {
        assert_eq!(canonical_ph_mobile("09171234567"), "+639171234567");
        assert_eq!(canonical_ph_mobile(""), "");
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_fields() {
        let mut form = valid_form();
        form.full_name = "Juan 3rd".to_owned();
        form.student_number = "21A3456".to_owned();
        form.graduation_year = 1800;
        form.mobile = "12345".to_owned();
        form.email = "not-an-email".to_owned();

        let errors = form.validate().unwrap_err();
        let fields: Vec<&str> = errors.fields.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            ["fullName", "studentNumber", "graduationYear", "mobile", "email"]
        );
    }

    #[test]
    fn test_rejects_missing_attachments() {
        let mut form = valid_form();
        form.photo = String::new();
        form.esig = String::new();

        let errors = form.validate().unwrap_err();
        assert!(errors.fields.iter().any(|e| e.field == "photo"));
        assert!(errors.fields.iter().any(|e| e.field == "esig"));
    }

    #[test]
    fn test_rejects_oversized_photo() {
        let mut form = valid_form();
        // 2 MiB of payload once decoded.
        let payload = "A".repeat(2 * 1024 * 1024 * 4 / 3);
        form.photo = format!("data:image/png;base64,{payload}");

        let errors = form.validate().unwrap_err();
        assert!(errors.fields.iter().any(|e| e.field == "photo"));
    }

    #[test]
    fn test_canonicalized_normalizes_mobile() {
        let mut form = valid_form();
        form.mobile = "0917 123 4567".to_owned();
        form.full_name = "  Juan dela Cruz ".to_owned();

        let canonical = form.canonicalized();
        assert_eq!(canonical.mobile, "+639171234567");
        assert_eq!(canonical.full_name, "Juan dela Cruz");
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_value(valid_form()).unwrap();
        assert!(json.get("fullName").is_some());
        assert!(json.get("studentNumber").is_some());
        assert!(json.get("graduationYear").is_some());
    }
}
