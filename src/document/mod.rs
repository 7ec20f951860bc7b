//! Uploaded documents: records, file storage and submission.

mod blob_store;
mod models;
mod service;
mod sqlite_document_store;
mod store;
mod upload;

pub use blob_store::{BlobError, BlobStore, FsBlobStore};
pub use models::{
    Branch, Category, Document, DocumentListing, DocumentStatus, FileType, GuardedDelete,
    NewDocument, StatusCounts, StatusTransition, MAX_DESCRIPTION_LENGTH, MAX_SUBJECT_LENGTH,
};
pub use service::{DocumentError, DocumentService};
pub use sqlite_document_store::{SqliteDocumentStore, DOCUMENT_TABLE_V_0};
pub use store::DocumentStore;
pub use upload::{
    DocumentUpload, UploadError, UploadPolicy, DEFAULT_ALLOWED_EXTENSIONS,
    DEFAULT_MAX_FILE_SIZE_MB,
};
