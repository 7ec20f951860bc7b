//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own database, media directory and
//! recording notifier.

use super::constants::*;
use super::fixtures::{seed_document, seed_users, DocumentSeed, SeededUsers};
use docportal_server::document::{FsBlobStore, SqliteDocumentStore, UploadPolicy};
use docportal_server::notifications::MemoryNotifier;
use docportal_server::server::{make_app, RequestsLoggingLevel, ServerConfig, ServerState};
use docportal_server::sqlite_persistence::SqliteDatabase;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with isolated storage
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// Every notification the server tried to send
    pub notifier: Arc<MemoryNotifier>,

    /// Direct store access for seeding and verifying state
    pub documents: Arc<SqliteDocumentStore>,
    pub blobs: Arc<FsBlobStore>,

    pub users: SeededUsers,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port
    ///
    /// # Panics
    ///
    /// Panics if the storage can't be created or the server doesn't become ready
    /// within the timeout.
    pub async fn spawn() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db = SqliteDatabase::open(temp_dir.path().join("portal.db"))
            .expect("Failed to open portal database");
        let blobs = Arc::new(
            FsBlobStore::new(temp_dir.path().join("media"))
                .await
                .expect("Failed to create blob store"),
        );
        let notifier = Arc::new(MemoryNotifier::new());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };
        let state = ServerState::new(
            config,
            db.clone(),
            blobs.clone(),
            notifier.clone(),
            UploadPolicy::default(),
        );
        let users = seed_users(&state.user_manager).expect("Failed to seed users");
        let app = make_app(state).expect("Failed to build app");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            notifier,
            documents: Arc::new(SqliteDocumentStore::new(db)),
            blobs,
            users,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;
        server
    }

    /// Inserts a document directly, bypassing the upload endpoint
    pub async fn seed_document(&self, seed: DocumentSeed<'_>) -> usize {
        seed_document(&self.documents, &self.blobs, seed)
            .await
            .expect("Failed to seed document")
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
