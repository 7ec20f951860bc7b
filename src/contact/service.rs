use super::models::{ContactQuery, NewContactQuery};
use super::store::ContactStore;
use crate::catalog_query::{paginate, Page, PageRequest};
use crate::notifications::{Notification, Notifier};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("{0}")]
    Invalid(String),
    #[error("Contact query {0} not found")]
    NotFound(usize),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// The contact form inbox.
pub struct ContactService {
    store: Arc<dyn ContactStore>,
    notifier: Arc<dyn Notifier>,
}

impl ContactService {
    pub fn new(store: Arc<dyn ContactStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Stores the query, then confirms receipt to the sender on a best-effort basis.
    pub async fn submit(&self, query: NewContactQuery) -> Result<ContactQuery, ContactError> {
        let query = query.validated().map_err(ContactError::Invalid)?;
        let stored = self.store.create_query(&query, Utc::now().date_naive())?;
        info!("Received contact query {} from {}", stored.id, stored.email);

        let confirmation = Notification::ContactReceived {
            full_name: stored.full_name.clone(),
            email: stored.email.clone(),
            subject: stored.subject.clone(),
        };
        if let Err(err) = self.notifier.notify(&stored.email, &confirmation).await {
            warn!(
                "Failed to confirm contact query {} to {}: {}",
                stored.id, stored.email, err
            );
        }
        Ok(stored)
    }

    pub fn list(
        &self,
        is_read: bool,
        page: PageRequest,
        page_size: usize,
    ) -> Result<Page<ContactQuery>, ContactError> {
        Ok(paginate(
            page_size,
            page,
            || self.store.count_queries(is_read),
            |offset, limit| self.store.list_queries(is_read, offset, limit),
        )?)
    }

    pub fn unread_count(&self) -> Result<usize, ContactError> {
        Ok(self.store.count_queries(false)?)
    }

    /// Returns the query and marks it as read.
    pub fn open(&self, id: usize) -> Result<ContactQuery, ContactError> {
        let mut query = self.store.get_query(id)?.ok_or(ContactError::NotFound(id))?;
        if !query.is_read {
            self.store.mark_read(id)?;
            query.is_read = true;
        }
        Ok(query)
    }
}
