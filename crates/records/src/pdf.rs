//! PDF source returned by the webhook and its persisted payload form.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;

/// Data URL prefix used for inline PDFs.
pub const PDF_DATA_URL_PREFIX: &str = "data:application/pdf;base64,";

/// A generated identity card PDF: hosted remotely or inlined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfSource {
    /// Remote URL the webhook hosts the PDF at
    Url(String),

    /// Raw PDF bytes decoded from the webhook's base64 body
    Inline(Bytes),
}

impl PdfSource {
    /// Decodes an inline source from the webhook's base64 field.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not valid base64.
    pub fn from_base64(body: &str) -> Result<Self, base64::DecodeError> {
        Ok(Self::Inline(Bytes::from(BASE64.decode(body.trim())?)))
    }

    /// The source as the string the viewer consumes: the remote URL, or a
    /// `data:application/pdf;base64,` URL for inline bytes.
    #[must_use]
    pub fn as_source_string(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Inline(bytes) => format!("{PDF_DATA_URL_PREFIX}{}", BASE64.encode(bytes)),
        }
    }

    /// The payload persisted in the blob store: the source string's bytes.
    #[must_use]
    pub fn storage_payload(&self) -> Bytes {
        Bytes::from(self.as_source_string().into_bytes())
    }

    /// Reconstructs a source from a persisted payload.
    ///
    /// Accepts the two shapes this crate writes (remote URL, data URL) plus
    /// raw `%PDF` bytes written by older storage shapes. Anything else is
    /// treated as raw inline bytes.
    #[must_use]
    pub fn from_storage_payload(payload: &[u8]) -> Self {
        if let Ok(text) = core::str::from_utf8(payload) {
            if let Some(encoded) = text.strip_prefix(PDF_DATA_URL_PREFIX) {
                if let Ok(decoded) = BASE64.decode(encoded.trim()) {
                    return Self::Inline(Bytes::from(decoded));
                }
            }
            if text.starts_with("http://") || text.starts_with("https://") {
                return Self::Url(text.to_owned());
            }
        }
        Self::Inline(Bytes::copy_from_slice(payload))
    }

    /// Inline PDF bytes, if this source carries them.
    #[must_use]
    pub fn inline_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Url(_) => None,
            Self::Inline(bytes) => Some(bytes),
        }
    }
}
