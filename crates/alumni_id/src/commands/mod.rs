//! CLI command implementations.

use std::path::Path;

use anyhow::{Context, Result};
use records::PdfSource;

pub mod dashboard;
pub mod export;
pub mod generate;

/// Writes a PDF source to disk, downloading it first when the webhook
/// returned a hosted URL.
pub(crate) async fn write_pdf(source: &PdfSource, out: &Path) -> Result<()> {
    let bytes = match source {
        PdfSource::Inline(bytes) => bytes.clone(),
        PdfSource::Url(url) => reqwest::get(url)
            .await
            .and_then(reqwest::Response::error_for_status)
            .context("Failed to download the ID card PDF")?
            .bytes()
            .await
            .context("Failed to download the ID card PDF")?,
    };

    std::fs::write(out, &bytes)
        .with_context(|| format!("Failed to write PDF to {}", out.display()))?;
    println!("Saved {}", out.display());
    Ok(())
}
