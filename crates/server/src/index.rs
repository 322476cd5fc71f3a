//! Index building and publication.

use crate::error::{ApiError, ApiResult};
use pallet_core::config::{IndexConfig, SigningConfig};
use pallet_core::hierarchy::HierarchyPath;
use pallet_core::index::attach_signature;
use pallet_core::{ApkIndex, PackageCodec, ARTIFACT_SUFFIX, SIGNING_KEY_SUFFIX};
use pallet_signer::{Ed25519Signer, IndexSigner};
use pallet_storage::HierarchyStore;
use serde::Serialize;
use std::sync::Arc;

/// Outcome of one rebuild, returned by the explicit rebuild endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct RebuildReport {
    /// Number of packages included in the published index.
    pub packages: usize,
    /// Per-artifact problems that did not abort the rebuild.
    pub warnings: Vec<String>,
}

/// Rebuilds and publishes the signed index of an architecture bucket.
pub struct IndexBuilder {
    store: Arc<dyn HierarchyStore>,
    codec: Arc<dyn PackageCodec>,
    index_config: IndexConfig,
    signing_config: SigningConfig,
}

impl IndexBuilder {
    pub fn new(
        store: Arc<dyn HierarchyStore>,
        codec: Arc<dyn PackageCodec>,
        index_config: IndexConfig,
        signing_config: SigningConfig,
    ) -> Self {
        Self {
            store,
            codec,
            index_config,
            signing_config,
        }
    }

    /// Rebuild the index for one architecture bucket and publish it
    /// atomically onto the bucket's index key.
    ///
    /// Artifacts that fail to decode are excluded and reported as warnings;
    /// a missing or ambiguous signing key aborts the whole rebuild and the
    /// previous index stays in place.
    pub async fn rebuild(&self, path: &HierarchyPath) -> ApiResult<RebuildReport> {
        let signer = self.load_signer(path).await?;

        let description = self
            .index_config
            .description
            .clone()
            .unwrap_or_else(|| format!("{} {} {}", path.org(), path.distro(), path.repo()));
        let mut index = ApkIndex::new(description);
        let mut warnings = Vec::new();

        let entries = self.store.list(&path.packages_dir()).await?;
        for entry in entries {
            if entry.is_dir || !entry.name.ends_with(ARTIFACT_SUFFIX) {
                continue;
            }
            let key = format!("{}/{}", path.packages_dir(), entry.name);
            let data = self.store.get(&key).await?;
            match self.codec.decode(&data) {
                Ok(meta) => index.push(meta, data.len() as u64),
                Err(e) => {
                    tracing::warn!(bucket = %path, file = %entry.name, error = %e,
                        "excluding undecodable artifact from index");
                    warnings.push(format!("{}: {e}", entry.name));
                }
            }
        }

        let control = index.build_control_archive().map_err(ApiError::Core)?;
        let signature = signer.sign(&control);
        let signed = attach_signature(&control, &signer.signature_entry_name(), &signature)
            .map_err(ApiError::Core)?;

        self.store
            .put(&path.index_key(), bytes::Bytes::from(signed))
            .await?;

        tracing::info!(
            bucket = %path,
            packages = index.packages.len(),
            warnings = warnings.len(),
            key_name = signer.key_name(),
            "index published"
        );

        Ok(RebuildReport {
            packages: index.packages.len(),
            warnings,
        })
    }

    /// Resolve the signing key for a bucket.
    ///
    /// A configured `signing.key_path` wins; otherwise the bucket's
    /// org/distro config directory must hold exactly one `*.key` file.
    async fn load_signer(&self, path: &HierarchyPath) -> ApiResult<Ed25519Signer> {
        if let Some(key_path) = &self.signing_config.key_path {
            let content = tokio::fs::read_to_string(key_path).await.map_err(|e| {
                ApiError::Configuration(format!(
                    "cannot read signing key {}: {e}",
                    key_path.display()
                ))
            })?;
            return Ed25519Signer::from_secret_key(&content).map_err(ApiError::Signer);
        }

        let dir = path.signing_dir();
        let mut key_files: Vec<String> = self
            .store
            .list(&dir)
            .await?
            .into_iter()
            .filter(|e| !e.is_dir && e.name.ends_with(SIGNING_KEY_SUFFIX))
            .map(|e| e.name)
            .collect();

        let key_file = match key_files.len() {
            0 => {
                return Err(ApiError::Configuration(format!(
                    "no signing key under {dir}"
                )));
            }
            1 => key_files.remove(0),
            n => {
                return Err(ApiError::Configuration(format!(
                    "{n} signing keys under {dir}, expected exactly one"
                )));
            }
        };

        let content = self.store.get(&format!("{dir}/{key_file}")).await?;
        let content = String::from_utf8_lossy(&content);
        Ed25519Signer::from_secret_key(&content).map_err(ApiError::Signer)
    }
}
