//! Submission flow: asset lookup, webhook call, local persistence.

use std::sync::Arc;

use records::{AlumniRecord, FormSubmission, PdfSource};
use storage::{BlobStore, RecordIndex};
use tracing::{info, warn};

use crate::api::client::WebhookClient;
use crate::api::models::WebhookPayload;
use crate::error::SubmitError;
use crate::script_fetch::{
    AssetKind, CallbackRegistry, SchoolAsset, ScriptLoader, fetch_school_asset,
};

/// Result of one successful submission: the persisted record plus the
/// PDF source for immediate display.
#[derive(Debug, Clone)]
pub struct GeneratedCard {
    /// The record written to the index
    pub record: AlumniRecord,

    /// The generated PDF
    pub pdf: PdfSource,
}

/// Coordinates one submission end to end.
pub struct SubmissionOrchestrator {
    client: WebhookClient,
    script_url: Option<String>,
    loader: Arc<dyn ScriptLoader>,
    registry: Arc<CallbackRegistry>,
    index: Arc<dyn RecordIndex>,
    blobs: Arc<dyn BlobStore>,
}

impl SubmissionOrchestrator {
    #[must_use]
    pub fn new(
        client: WebhookClient,
        script_url: Option<String>,
        loader: Arc<dyn ScriptLoader>,
        index: Arc<dyn RecordIndex>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            client,
            script_url,
            loader,
            registry: Arc::new(CallbackRegistry::new()),
            index,
            blobs,
        }
    }

    /// Submits a validated form and returns the generated card.
    ///
    /// Asset lookup cannot fail (it degrades to `None`s); the webhook
    /// call surfaces a [`SubmitError`] on any failure. Persistence is
    /// best-effort: a storage failure is logged and the card is still
    /// returned, though it may be unavailable on a later visit.
    ///
    /// # Errors
    ///
    /// Returns the user-facing submission error; nothing is persisted in
    /// that case.
    pub async fn submit(&self, form: FormSubmission) -> Result<GeneratedCard, SubmitError> {
        let (logo, template) = self.fetch_assets(&form.school).await;

        let payload = WebhookPayload {
            form: form.clone(),
            logo_file_id: logo.file_id,
            template_file_id: template.file_id,
            template_content: template.content,
        };

        let pdf = self.client.generate_card(&payload).await?;
        let record = persist_generated(self.index.as_ref(), self.blobs.as_ref(), form, &pdf).await;

        info!(id = %record.id, "Generated ID card");
        Ok(GeneratedCard { record, pdf })
    }

    /// Fetches the school's logo and template in parallel when a script
    /// endpoint is configured and the form names a school.
    async fn fetch_assets(&self, school: &str) -> (SchoolAsset, SchoolAsset) {
        let Some(script_url) = self.script_url.as_deref() else {
            return (SchoolAsset::default(), SchoolAsset::default());
        };
        if school.is_empty() {
            return (SchoolAsset::default(), SchoolAsset::default());
        }

        tokio::join!(
            fetch_school_asset(
                self.loader.as_ref(),
                &self.registry,
                script_url,
                school,
                AssetKind::Logo,
            ),
            fetch_school_asset(
                self.loader.as_ref(),
                &self.registry,
                script_url,
                school,
                AssetKind::Template,
            ),
        )
    }
}

/// Writes a fresh record for the submission: prepended to the index list,
/// PDF payload in the blob store under the record id, and the last-form
/// snapshot for pre-filling the next edit.
///
/// Every write is best-effort; failures are logged and swallowed so the
/// in-memory card still reaches the caller.
pub async fn persist_generated(
    index: &dyn RecordIndex,
    blobs: &dyn BlobStore,
    form: FormSubmission,
    pdf: &PdfSource,
) -> AlumniRecord {
    let record = AlumniRecord::from_submission(form);

    let mut list = match index.load_list().await {
        Ok(list) => list,
        Err(error) => {
            warn!("Failed to load record list before save: {error}");
            Vec::new()
        }
    };
    list.insert(0, record.clone());
    if let Err(error) = index.save_list(&list).await {
        warn!(id = %record.id, "Failed to save record list: {error}");
    }

    if let Err(error) = blobs.put(record.id, pdf.storage_payload()).await {
        warn!(id = %record.id, "Failed to store PDF payload: {error}");
    }

    if let Err(error) = index.save_last_form(&record.form_data).await {
        warn!("Failed to save last-form snapshot: {error}");
    }

    record
}
