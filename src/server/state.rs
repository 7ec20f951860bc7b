use axum::extract::FromRef;

use crate::catalog_query::CatalogQueryEngine;
use crate::contact::{ContactService, SqliteContactStore};
use crate::document::{BlobStore, DocumentService, DocumentStore, SqliteDocumentStore, UploadPolicy};
use crate::moderation::ModerationEngine;
use crate::notifications::Notifier;
use crate::sqlite_persistence::SqliteDatabase;
use crate::user::{SqliteUserStore, UserManager};
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedUserManager = Arc<UserManager>;
pub type GuardedDocumentService = Arc<DocumentService>;
pub type GuardedCatalogEngine = Arc<CatalogQueryEngine>;
pub type GuardedModerationEngine = Arc<ModerationEngine>;
pub type GuardedContactService = Arc<ContactService>;
pub type GuardedDocumentStore = Arc<dyn DocumentStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub user_manager: GuardedUserManager,
    pub document_service: GuardedDocumentService,
    pub catalog: GuardedCatalogEngine,
    pub moderation: GuardedModerationEngine,
    pub contact: GuardedContactService,
    pub document_store: GuardedDocumentStore,
}

impl ServerState {
    /// Wires every service on top of one database, one blob store and one notifier.
    pub fn new(
        config: ServerConfig,
        db: SqliteDatabase,
        blobs: Arc<dyn BlobStore>,
        notifier: Arc<dyn Notifier>,
        upload_policy: UploadPolicy,
    ) -> ServerState {
        let user_store = Arc::new(SqliteUserStore::new(db.clone()));
        let document_store: GuardedDocumentStore = Arc::new(SqliteDocumentStore::new(db.clone()));
        let contact_store = Arc::new(SqliteContactStore::new(db));

        ServerState {
            config,
            start_time: Instant::now(),
            user_manager: Arc::new(UserManager::new(
                user_store.clone(),
                document_store.clone(),
                blobs.clone(),
                notifier.clone(),
            )),
            document_service: Arc::new(DocumentService::new(
                document_store.clone(),
                blobs.clone(),
                notifier.clone(),
                upload_policy,
            )),
            catalog: Arc::new(CatalogQueryEngine::new(document_store.clone())),
            moderation: Arc::new(ModerationEngine::new(
                document_store.clone(),
                user_store,
                notifier.clone(),
                blobs,
            )),
            contact: Arc::new(ContactService::new(contact_store, notifier)),
            document_store,
        }
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}

impl FromRef<ServerState> for GuardedUserManager {
    fn from_ref(input: &ServerState) -> Self {
        input.user_manager.clone()
    }
}

impl FromRef<ServerState> for GuardedDocumentService {
    fn from_ref(input: &ServerState) -> Self {
        input.document_service.clone()
    }
}

impl FromRef<ServerState> for GuardedCatalogEngine {
    fn from_ref(input: &ServerState) -> Self {
        input.catalog.clone()
    }
}

impl FromRef<ServerState> for GuardedModerationEngine {
    fn from_ref(input: &ServerState) -> Self {
        input.moderation.clone()
    }
}

impl FromRef<ServerState> for GuardedContactService {
    fn from_ref(input: &ServerState) -> Self {
        input.contact.clone()
    }
}

impl FromRef<ServerState> for GuardedDocumentStore {
    fn from_ref(input: &ServerState) -> Self {
        input.document_store.clone()
    }
}
