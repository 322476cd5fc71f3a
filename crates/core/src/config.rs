//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8888").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    /// When enabled, restrict the endpoint to scraper IPs at the
    /// infrastructure level.
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
    /// Largest accepted request body, in bytes (default: 500 MiB). Bounds
    /// package uploads; artifacts above it are rejected as client errors.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_bind() -> String {
    "127.0.0.1:8888".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

fn default_max_upload_bytes() -> usize {
    500 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            metrics_enabled: default_metrics_enabled(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

/// Hierarchy store backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem tree rooted at `path`.
    Filesystem {
        /// Root directory holding the `static/` and `config/` subtrees.
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("/srv/packages"),
        }
    }
}

/// Index builder configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Description line embedded in every published index. Defaults to
    /// "<org> <distro> <repo>" when unset.
    #[serde(default)]
    pub description: Option<String>,
    /// Upper bound on a single rebuild attempt, in seconds. A hung rebuild
    /// only stalls its own path; other paths keep building.
    #[serde(default = "default_rebuild_timeout_secs")]
    pub rebuild_timeout_secs: u64,
}

fn default_rebuild_timeout_secs() -> u64 {
    300
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            description: None,
            rebuild_timeout_secs: default_rebuild_timeout_secs(),
        }
    }
}

impl IndexConfig {
    /// Get the rebuild timeout as a Duration.
    pub fn rebuild_timeout(&self) -> Duration {
        Duration::from_secs(self.rebuild_timeout_secs)
    }
}

/// Signing configuration.
///
/// By default the signing key is resolved per (org, distro) from the
/// hierarchy's config subtree; `key_path` overrides that with a fixed
/// key file (typically supplied via `PALLET_SIGNING__KEY_PATH`).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SigningConfig {
    /// Path to a key file in `name:base64` format, overriding per-distro
    /// key lookup for every rebuild.
    #[serde(default)]
    pub key_path: Option<PathBuf>,
}

/// Top-level application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub signing: SigningConfig,
}

impl AppConfig {
    /// Create a test configuration rooted at the given directory.
    ///
    /// **For testing only.**
    pub fn for_testing(root: impl Into<PathBuf>) -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::Filesystem { path: root.into() },
            index: IndexConfig {
                description: Some("test repository".to_string()),
                rebuild_timeout_secs: 30,
            },
            signing: SigningConfig::default(),
        }
    }
}
