use super::error::ModerationError;
use crate::document::{
    BlobStore, Document, DocumentStatus, DocumentStore, GuardedDelete, StatusTransition,
};
use crate::notifications::{DocumentNotice, Notification, Notifier, StatusNoticeKind};
use crate::user::{AuthContext, UserStore};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Owns the document status state machine and its side effects.
///
/// Status changes and deletes are committed before any side effect runs. Notification
/// and file removal failures are logged and never turn a committed change into an error.
pub struct ModerationEngine {
    documents: Arc<dyn DocumentStore>,
    users: Arc<dyn UserStore>,
    notifier: Arc<dyn Notifier>,
    blobs: Arc<dyn BlobStore>,
}

impl ModerationEngine {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        users: Arc<dyn UserStore>,
        notifier: Arc<dyn Notifier>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            documents,
            users,
            notifier,
            blobs,
        }
    }

    /// Sets the status of a document, notifying its owner when the status actually
    /// changed to `Accept` or `Reject`.
    ///
    /// Re-applying the current status is allowed and persists without notifying. Callers
    /// that are not administrators are refused first; a missing document is reported
    /// before an invalid status value.
    pub async fn set_status(
        &self,
        document_id: usize,
        new_status: &str,
        actor: &AuthContext,
    ) -> Result<StatusTransition, ModerationError> {
        if !actor.is_admin {
            return Err(ModerationError::Authorization(format!(
                "user {} cannot moderate documents",
                actor.user_id
            )));
        }
        if self.documents.get_document(document_id)?.is_none() {
            return Err(ModerationError::NotFound(document_id));
        }
        let status = DocumentStatus::parse(new_status)
            .ok_or_else(|| ModerationError::InvalidStatus(new_status.to_string()))?;

        let transition = self
            .documents
            .update_status(document_id, status)?
            .ok_or(ModerationError::NotFound(document_id))?;
        info!(
            "Admin {} set document {} status {} -> {}",
            actor.user_id,
            document_id,
            transition.previous,
            transition.current()
        );

        if transition.changed() {
            if let Some(kind) = StatusNoticeKind::for_status(transition.current()) {
                self.notify_owner(&transition.document, kind).await;
            }
        }
        Ok(transition)
    }

    /// Deletes a document on behalf of its owner or an administrator.
    pub async fn delete_document(
        &self,
        document_id: usize,
        actor: &AuthContext,
    ) -> Result<Document, ModerationError> {
        let outcome = self
            .documents
            .delete_document_if(document_id, &|document| actor.can_manage(document.owner_id))?;
        let document = match outcome {
            GuardedDelete::Deleted(document) => document,
            GuardedDelete::NotFound => return Err(ModerationError::NotFound(document_id)),
            GuardedDelete::Refused => {
                return Err(ModerationError::Authorization(format!(
                    "user {} cannot delete document {}",
                    actor.user_id, document_id
                )))
            }
        };
        info!(
            "User {} deleted document {} owned by {}",
            actor.user_id, document_id, document.owner_id
        );

        match self.blobs.delete(document_id).await {
            Ok(true) => {}
            Ok(false) => warn!("Deleted document {} had no stored file", document_id),
            Err(err) => error!(
                "Failed to delete stored file of document {}: {}",
                document_id, err
            ),
        }
        Ok(document)
    }

    async fn notify_owner(&self, document: &Document, kind: StatusNoticeKind) {
        let owner = match self.users.get_user(document.owner_id) {
            Ok(Some(owner)) => owner,
            Ok(None) => {
                warn!(
                    "Owner {} of document {} not found, skipping notification",
                    document.owner_id, document.id
                );
                return;
            }
            Err(err) => {
                error!(
                    "Failed to load owner {} of document {}: {}",
                    document.owner_id, document.id, err
                );
                return;
            }
        };

        let notification = Notification::DocumentStatus {
            kind,
            document: DocumentNotice::new(document, &owner.first_name),
        };
        match self.notifier.notify(&owner.email, &notification).await {
            Ok(()) => info!(
                "Sent {:?} notice for document {} to {}",
                kind, document.id, owner.email
            ),
            Err(err) => error!(
                "Status change of document {} committed but notification failed: {}",
                document.id, err
            ),
        }
    }
}
