//! Blob store holding PDF payloads, keyed by record id.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use object_store::ObjectStore;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectStorePath;
use records::{AlumniRecord, PdfSource};
use tracing::warn;
use uuid::Uuid;

use crate::error::StorageError;

/// Persistent store for PDF payloads, outside the record index.
///
/// The payload is opaque bytes to the store; reading an id that was never
/// written yields `None`, not an error.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Writes the payload for a record id, replacing any prior payload.
    async fn put(&self, id: Uuid, data: Bytes) -> Result<(), StorageError>;

    /// Reads the payload for a record id.
    async fn get(&self, id: Uuid) -> Result<Option<Bytes>, StorageError>;
}

/// [`BlobStore`] backed by a local filesystem object store, one object
/// per record id under `pdfs/`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    store: Arc<dyn ObjectStore>,
}

impl FsBlobStore {
    /// Opens the store rooted at `base_dir`, creating the directory if
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or used as an
    /// object store prefix.
    pub fn open(base_dir: &Path) -> Result<Self, StorageError> {
        std::fs::create_dir_all(base_dir)?;
        let store = LocalFileSystem::new_with_prefix(base_dir)?;
        Ok(Self {
            store: Arc::new(store),
        })
    }

    fn object_path(id: Uuid) -> ObjectStorePath {
        ObjectStorePath::from(format!("pdfs/{id}.pdf"))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, id: Uuid, data: Bytes) -> Result<(), StorageError> {
        self.store
            .put(&Self::object_path(id), data.into())
            .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Bytes>, StorageError> {
        match self.store.get(&Self::object_path(id)).await {
            Ok(result) => Ok(Some(result.bytes().await?)),
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }
}

/// Resolves the viewable PDF for a record: the blob store entry under the
/// record id, else the record's legacy inline source, else nothing.
///
/// Blob store failures degrade to the legacy fallback rather than
/// surfacing; the caller reports a missing result as "no longer
/// available".
pub async fn resolve_pdf(blobs: &dyn BlobStore, record: &AlumniRecord) -> Option<PdfSource> {
    match blobs.get(record.id).await {
        Ok(Some(payload)) => return Some(PdfSource::from_storage_payload(&payload)),
        Ok(None) => {}
        Err(error) => {
            warn!(id = %record.id, "Blob store read failed: {error}");
        }
    }

    record
        .pdf_source
        .as_deref()
        .map(|source| PdfSource::from_storage_payload(source.as_bytes()))
}
