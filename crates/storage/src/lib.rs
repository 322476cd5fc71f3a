//! Hierarchy store abstraction for package trees.
//!
//! Provides the [`HierarchyStore`] trait and the filesystem backend. Keys
//! are `/`-separated relative paths under a configured root; the backend
//! guarantees atomic writes and rejects traversal outside the root.

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::FilesystemStore;
pub use error::{StorageError, StorageResult};
pub use traits::{ByteStream, DirEntry, HierarchyStore, WalkEntry, WalkStream};

use pallet_core::StorageConfig;
use std::sync::Arc;

/// Build a hierarchy store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn HierarchyStore>> {
    match config {
        StorageConfig::Filesystem { path } => {
            let store = FilesystemStore::new(path).await?;
            Ok(Arc::new(store))
        }
    }
}
