//! Storage for uploaded file bytes, keyed by document id.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob for document {0} not found")]
    NotFound(usize),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for BlobError {
    fn from(e: std::io::Error) -> Self {
        BlobError::Io(e.to_string())
    }
}

#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `data` for the document, replacing anything stored before.
    async fn put(&self, document_id: usize, data: &[u8]) -> Result<(), BlobError>;

    /// Returns the stored bytes or `BlobError::NotFound`.
    async fn get(&self, document_id: usize) -> Result<Vec<u8>, BlobError>;

    /// Returns Ok(true) if a blob was deleted, Ok(false) if there was none.
    async fn delete(&self, document_id: usize) -> Result<bool, BlobError>;
}

/// Keeps each blob in its own file under `<root>/documents/<id>`.
///
/// Writes go to a uniquely named temp file first and are renamed into place, so a
/// reader never observes a partially written blob.
pub struct FsBlobStore {
    dir: PathBuf,
}

impl FsBlobStore {
    pub async fn new<P: AsRef<Path>>(media_path: P) -> Result<Self, BlobError> {
        let dir = media_path.as_ref().join("documents");
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    fn blob_path(&self, document_id: usize) -> PathBuf {
        self.dir.join(document_id.to_string())
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await
}

#[async_trait::async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, document_id: usize, data: &[u8]) -> Result<(), BlobError> {
        let tmp_path = self
            .dir
            .join(format!(".tmp-{}-{}", document_id, uuid::Uuid::new_v4()));
        if let Err(err) = write_synced(&tmp_path, data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err.into());
        }
        fs::rename(&tmp_path, self.blob_path(document_id)).await?;
        Ok(())
    }

    async fn get(&self, document_id: usize) -> Result<Vec<u8>, BlobError> {
        match fs::read(self.blob_path(document_id)).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(BlobError::NotFound(document_id))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn delete(&self, document_id: usize) -> Result<bool, BlobError> {
        match fs::remove_file(self.blob_path(document_id)).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
