//! Server test utilities.

use bytes::Bytes;
use pallet_core::config::AppConfig;
use pallet_server::{create_router, AppState};
use pallet_signer::KeyPair;
use pallet_storage::{FilesystemStore, HierarchyStore};
use std::sync::Arc;
use tempfile::TempDir;

/// A test server wrapper over a real filesystem tree.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    _temp_dir: TempDir,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let store: Arc<dyn HierarchyStore> = Arc::new(
            FilesystemStore::new(temp_dir.path())
                .await
                .expect("Failed to create storage backend"),
        );

        let mut config = AppConfig::for_testing(temp_dir.path());
        modifier(&mut config);

        let state = AppState::new(config, store);
        let router = create_router(state.clone());

        Self {
            router,
            state,
            _temp_dir: temp_dir,
        }
    }

    /// Get access to the underlying store.
    pub fn store(&self) -> Arc<dyn HierarchyStore> {
        self.state.store.clone()
    }

    /// Write a token file for an org.
    pub async fn add_token(&self, org: &str, file: &str, token: &str) {
        self.state
            .store
            .put(
                &format!("config/{org}/tokens/{file}"),
                Bytes::from(token.to_string()),
            )
            .await
            .expect("Failed to write token file");
    }

    /// Write a signing key for an (org, distro) and return the key pair.
    pub async fn add_signing_key(&self, org: &str, distro: &str, name: &str) -> KeyPair {
        let keypair = KeyPair::generate(name);
        self.state
            .store
            .put(
                &format!("config/{org}/{distro}/{name}.key"),
                Bytes::from(keypair.to_secret_key()),
            )
            .await
            .expect("Failed to write signing key");
        keypair
    }

    /// Write an artifact directly into the tree, bypassing the API.
    pub async fn put_raw(&self, key: &str, data: Bytes) {
        self.state
            .store
            .put(key, data)
            .await
            .expect("Failed to write file");
    }
}
