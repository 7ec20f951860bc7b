use super::models::{
    Document, DocumentListing, DocumentStatus, GuardedDelete, NewDocument, StatusCounts,
    StatusTransition,
};
use crate::catalog_query::CatalogQuery;
use anyhow::Result;
use chrono::NaiveDate;

pub trait DocumentStore: Send + Sync {
    /// Inserts a new document in `pending` status and returns it.
    fn create_document(&self, document: &NewDocument, upload_date: NaiveDate)
        -> Result<Document>;

    /// Returns Ok(None) if the document does not exist.
    fn get_document(&self, id: usize) -> Result<Option<Document>>;

    /// Reads the current status and writes the new one in a single transaction.
    /// Returns Ok(None) if the document does not exist.
    fn update_status(&self, id: usize, status: DocumentStatus)
        -> Result<Option<StatusTransition>>;

    /// Deletes the document only if `allow` accepts it, checking and deleting in a
    /// single transaction.
    fn delete_document_if(
        &self,
        id: usize,
        allow: &dyn Fn(&Document) -> bool,
    ) -> Result<GuardedDelete>;

    /// Unconditional delete. Returns false if the document did not exist.
    fn remove_document(&self, id: usize) -> Result<bool>;

    /// Returns the new count, or Ok(None) if the document does not exist.
    fn increment_download_count(&self, id: usize) -> Result<Option<u64>>;

    fn count_matching(&self, query: &CatalogQuery) -> Result<usize>;

    /// Returns a window of matching documents, newest upload first, ties by ascending id.
    fn fetch_matching(
        &self,
        query: &CatalogQuery,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<DocumentListing>>;

    fn count_by_status(&self) -> Result<StatusCounts>;

    fn get_document_ids_by_owner(&self, owner_id: usize) -> Result<Vec<usize>>;
}
