use super::blob_store::{BlobError, BlobStore};
use super::models::{Document, DocumentStatus};
use super::store::DocumentStore;
use super::upload::{DocumentUpload, UploadError, UploadPolicy};
use crate::notifications::Notifier;
use crate::user::AuthContext;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Document {0} not found")]
    NotFound(usize),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("File storage failed: {0}")]
    Blob(#[from] BlobError),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Document submission and file access.
pub struct DocumentService {
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobStore>,
    notifier: Arc<dyn Notifier>,
    policy: UploadPolicy,
}

impl DocumentService {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobStore>,
        notifier: Arc<dyn Notifier>,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            documents,
            blobs,
            notifier,
            policy,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Stores a new document in `pending` status.
    ///
    /// The row is inserted first so the blob can be keyed by its id; if the blob cannot be
    /// written the row is removed again.
    pub async fn upload(
        &self,
        upload: DocumentUpload,
        actor: &AuthContext,
    ) -> Result<Document, DocumentError> {
        let (new_document, data) = upload.into_new_document(actor.user_id, &self.policy)?;
        let document = self
            .documents
            .create_document(&new_document, Utc::now().date_naive())?;

        if let Err(err) = self.blobs.put(document.id, &data).await {
            error!(
                "Failed to store file of document {}, removing it: {}",
                document.id, err
            );
            if let Err(remove_err) = self.documents.remove_document(document.id) {
                error!(
                    "Failed to remove document {} after storage failure: {}",
                    document.id, remove_err
                );
            }
            return Err(err.into());
        }

        info!(
            "User {} uploaded document {} \"{}\" ({} bytes)",
            actor.user_id,
            document.id,
            document.subject,
            data.len()
        );
        self.notifier.document_submitted(&document).await;
        Ok(document)
    }

    /// Returns the document and its bytes, counting the download.
    ///
    /// Accepted documents are readable by everyone; others only by their owner and by
    /// administrators, and look missing to anybody else.
    pub async fn download(
        &self,
        id: usize,
        actor: &AuthContext,
    ) -> Result<(Document, Vec<u8>), DocumentError> {
        let document = self
            .documents
            .get_document(id)?
            .ok_or(DocumentError::NotFound(id))?;
        if document.status != DocumentStatus::Accept && !actor.can_manage(document.owner_id) {
            return Err(DocumentError::NotFound(id));
        }

        let data = self.blobs.get(id).await?;
        let download_count = self
            .documents
            .increment_download_count(id)?
            .ok_or(DocumentError::NotFound(id))?;
        Ok((
            Document {
                download_count,
                ..document
            },
            data,
        ))
    }
}
