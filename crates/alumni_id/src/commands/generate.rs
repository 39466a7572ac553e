//! Generate command - submits a form payload and stores the new ID.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use config::Config;
use records::{FormSubmission, PdfSource};
use storage::{FsBlobStore, SqliteRecordIndex, load_dashboard};
use uuid::Uuid;
use webhook_client::{HttpScriptLoader, SubmissionOrchestrator, WebhookClient};

/// Runs the generate command.
///
/// An edit re-submits the stored form snapshot of an existing record and
/// creates a new record; the old entry is kept.
///
/// # Errors
///
/// Returns an error if the form payload is unreadable or invalid, or if
/// the submission fails.
pub async fn run(
    config: &Config,
    index: SqliteRecordIndex,
    blobs: FsBlobStore,
    form_path: Option<&Path>,
    edit: Option<Uuid>,
    out: Option<&Path>,
) -> Result<()> {
    let form = load_form(&index, form_path, edit).await?;

    let form = form.canonicalized();
    if let Err(errors) = form.validate() {
        for e in &errors.fields {
            println!("  {}: {}", e.field, e.message);
        }
        anyhow::bail!("Form validation failed");
    }

    let client = WebhookClient::new(Some(config.webhook_url.as_str()))?;
    let orchestrator = SubmissionOrchestrator::new(
        client,
        config.script_url.clone(),
        Arc::new(HttpScriptLoader::new()),
        Arc::new(index),
        Arc::new(blobs),
    );

    let card = orchestrator.submit(form).await?;
    println!("Generated Alumni ID {}", card.record.id);

    match (out, &card.pdf) {
        (Some(out), _) => super::write_pdf(&card.pdf, out).await?,
        (None, PdfSource::Url(url)) => println!("PDF hosted at {url}"),
        (None, PdfSource::Inline(_)) => {
            println!("This Alumni ID is saved on this device only.");
        }
    }

    Ok(())
}

/// Resolves the form to submit: a JSON payload file, or the stored
/// snapshot of the record being edited.
async fn load_form(
    index: &SqliteRecordIndex,
    form_path: Option<&Path>,
    edit: Option<Uuid>,
) -> Result<FormSubmission> {
    if let Some(path) = form_path {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read form file: {}", path.display()))?;
        return serde_json::from_str(&raw).context("Form file is not a valid form payload");
    }

    if let Some(id) = edit {
        let list = load_dashboard(index).await;
        let Some(record) = list.into_iter().find(|r| r.id == id) else {
            anyhow::bail!("No Alumni ID with id {id}");
        };
        return Ok(record.form_data);
    }

    anyhow::bail!("Provide a form payload with --form, or --edit an existing ID")
}
