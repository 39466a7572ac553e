//! Wire types for the generation webhook.

use records::FormSubmission;
use serde::{Deserialize, Serialize};

/// POST body sent to the webhook: all form fields plus the resolved
/// school assets, nullable when lookup was skipped or degraded.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    /// Submitted form fields
    #[serde(flatten)]
    pub form: FormSubmission,

    /// Resolved school logo file id
    pub logo_file_id: Option<String>,

    /// Resolved school template file id
    pub template_file_id: Option<String>,

    /// Inline template content
    pub template_content: Option<String>,
}

/// JSON body the webhook responds with.
///
/// Exactly one of `pdf_url` / `pdf_base64` is expected on success;
/// `message` / `error` may carry a user-facing explanation on failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    /// Remote URL of the generated PDF
    #[serde(default)]
    pub pdf_url: Option<String>,

    /// Base64-encoded PDF body
    #[serde(default)]
    pub pdf_base64: Option<String>,

    /// Explicit failure message
    #[serde(default)]
    pub message: Option<String>,

    /// Explicit failure detail
    #[serde(default)]
    pub error: Option<String>,
}
