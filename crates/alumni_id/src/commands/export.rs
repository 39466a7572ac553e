//! Export command - re-downloads a previously generated ID card.

use std::path::Path;

use anyhow::Result;
use storage::{FsBlobStore, SqliteRecordIndex, load_dashboard, resolve_pdf};
use uuid::Uuid;

/// Runs the export command.
///
/// # Errors
///
/// Returns an error if the record does not exist, the card is no longer
/// available on this device, or the PDF cannot be written.
pub async fn run(
    index: &SqliteRecordIndex,
    blobs: &FsBlobStore,
    id: Uuid,
    out: &Path,
) -> Result<()> {
    let list = load_dashboard(index).await;
    let Some(record) = list.iter().find(|r| r.id == id) else {
        anyhow::bail!("No Alumni ID with id {id}");
    };

    let Some(source) = resolve_pdf(blobs, record).await else {
        anyhow::bail!("This Alumni ID is no longer available on this device.");
    };

    super::write_pdf(&source, out).await
}
