//! Hierarchy store trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

/// A boxed stream of bytes for streaming reads.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// A boxed stream of walk entries.
pub type WalkStream = Pin<Box<dyn Stream<Item = StorageResult<WalkEntry>> + Send>>;

/// An immediate child of a listed directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// One entry yielded by a subtree walk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path relative to the walk root, `/`-separated.
    pub path: String,
    pub is_dir: bool,
}

/// Read/write access to a tree rooted at a configured base location.
///
/// Keys are `/`-separated relative paths. Callers are expected to build
/// keys from validated segments; the filesystem backend still re-checks
/// against traversal as defense in depth.
#[async_trait]
pub trait HierarchyStore: Send + Sync + 'static {
    /// List the immediate children of a directory, in the store's natural
    /// order. An absent directory yields an empty list, not an error.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<DirEntry>>;

    /// Check if an entry exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get a file's content. Fails with `NotFound` if absent.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Get a file as a byte stream. Fails with `NotFound` if absent.
    async fn get_stream(&self, key: &str) -> StorageResult<ByteStream>;

    /// Write a file atomically, creating parent directories and replacing
    /// any previous content. A reader never observes partial content: the
    /// bytes land under a temporary name and are renamed into place.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Delete a file. Idempotent: deleting an absent file is not an error.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Lazily walk the subtree under `root`, yielding every descendant.
    /// Each call starts a fresh walk; walks are not resumable.
    async fn walk(&self, root: &str) -> StorageResult<WalkStream>;

    /// Static identifier for the backend type, for logging.
    fn backend_name(&self) -> &'static str;

    /// Verify backend connectivity/configuration at startup.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
