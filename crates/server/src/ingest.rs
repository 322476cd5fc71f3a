//! Package ingestion.

use crate::error::{ApiError, ApiResult};
use bytes::Bytes;
use pallet_core::hierarchy::{HierarchyPath, Segment};
use pallet_core::{PackageCodec, PackageMeta, ARTIFACT_SUFFIX};
use pallet_storage::HierarchyStore;
use std::sync::Arc;

/// Validates and publishes uploaded package artifacts.
pub struct Ingestor {
    store: Arc<dyn HierarchyStore>,
    codec: Arc<dyn PackageCodec>,
}

impl Ingestor {
    pub fn new(store: Arc<dyn HierarchyStore>, codec: Arc<dyn PackageCodec>) -> Self {
        Self { store, codec }
    }

    /// Ingest one artifact into an architecture bucket.
    ///
    /// Validation happens strictly before any write: the filename must be a
    /// safe segment with the artifact suffix, and the bytes must decode as a
    /// well-formed package. A rejected upload leaves the bucket untouched.
    /// Re-ingesting an existing filename replaces the previous artifact.
    pub async fn ingest(
        &self,
        path: &HierarchyPath,
        file_name: &str,
        data: Bytes,
    ) -> ApiResult<PackageMeta> {
        let file_name = Segment::parse(file_name).map_err(ApiError::Core)?;
        if !file_name.as_str().ends_with(ARTIFACT_SUFFIX) {
            return Err(ApiError::BadRequest(format!(
                "file name must end with {ARTIFACT_SUFFIX}: {file_name}"
            )));
        }
        let meta = self.codec.decode(&data).map_err(|e| {
            crate::metrics::PACKAGES_REJECTED.inc();
            ApiError::Core(e)
        })?;

        let key = path.artifact_key(&file_name);
        // Delete-then-put keeps replacement explicit; the put itself is
        // atomic, so readers never see a partial artifact.
        self.store.delete(&key).await?;
        let size = data.len() as u64;
        self.store.put(&key, data).await?;

        crate::metrics::PACKAGES_INGESTED.inc();
        crate::metrics::BYTES_INGESTED.inc_by(size);
        tracing::info!(
            bucket = %path,
            file = %file_name,
            package = %meta.name,
            version = %meta.version,
            "package ingested"
        );

        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pallet_core::ApkCodec;
    use pallet_storage::FilesystemStore;

    fn fake_apk(name: &str, version: &str) -> Bytes {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let pkginfo = format!("pkgname = {name}\npkgver = {version}\n");
        let mut builder = tar::Builder::new(Vec::new());
        let mut header = tar::Header::new_gnu();
        header.set_size(pkginfo.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, ".PKGINFO", pkginfo.as_bytes())
            .unwrap();
        let tar_bytes = builder.into_inner().unwrap();

        let mut gz = GzEncoder::new(Vec::new(), Compression::default());
        std::io::Write::write_all(&mut gz, &tar_bytes).unwrap();
        Bytes::from(gz.finish().unwrap())
    }

    async fn ingestor() -> (tempfile::TempDir, Arc<dyn HierarchyStore>, Ingestor) {
        let dir = tempfile::tempdir().unwrap();
        let store: Arc<dyn HierarchyStore> =
            Arc::new(FilesystemStore::new(dir.path()).await.unwrap());
        let ingestor = Ingestor::new(store.clone(), Arc::new(ApkCodec));
        (dir, store, ingestor)
    }

    fn bucket() -> HierarchyPath {
        HierarchyPath::new("acme", "alpine", "3.18", "main", "x86_64").unwrap()
    }

    #[tokio::test]
    async fn ingest_writes_artifact_and_returns_metadata() {
        let (_dir, store, ingestor) = ingestor().await;

        let meta = ingestor
            .ingest(&bucket(), "hello-2.12-r1.apk", fake_apk("hello", "2.12-r1"))
            .await
            .unwrap();
        assert_eq!(meta.name, "hello");
        assert_eq!(meta.version, "2.12-r1");

        let key = "static/acme/alpine/3.18/main/x86_64/hello-2.12-r1.apk";
        assert!(store.exists(key).await.unwrap());
    }

    #[tokio::test]
    async fn reingest_replaces_previous_artifact() {
        let (_dir, store, ingestor) = ingestor().await;
        let path = bucket();

        let first = fake_apk("hello", "2.12-r1");
        let second = fake_apk("hello", "2.12-r1");
        ingestor
            .ingest(&path, "hello-2.12-r1.apk", first)
            .await
            .unwrap();
        ingestor
            .ingest(&path, "hello-2.12-r1.apk", second.clone())
            .await
            .unwrap();

        let key = "static/acme/alpine/3.18/main/x86_64/hello-2.12-r1.apk";
        assert_eq!(store.get(key).await.unwrap(), second);
    }

    #[tokio::test]
    async fn malformed_package_leaves_no_trace() {
        let (_dir, store, ingestor) = ingestor().await;

        let result = ingestor
            .ingest(&bucket(), "bad-1.0-r0.apk", Bytes::from("not a package"))
            .await;
        assert!(matches!(
            result,
            Err(ApiError::Core(pallet_core::Error::MalformedPackage(_)))
        ));

        let key = "static/acme/alpine/3.18/main/x86_64/bad-1.0-r0.apk";
        assert!(!store.exists(key).await.unwrap());
    }

    #[tokio::test]
    async fn traversal_filename_rejected_before_decode() {
        let (_dir, _store, ingestor) = ingestor().await;

        for name in ["../evil.apk", "a/b.apk", "..", ""] {
            let result = ingestor.ingest(&bucket(), name, Bytes::from("x")).await;
            assert!(
                matches!(
                    result,
                    Err(ApiError::Core(pallet_core::Error::InvalidPath(_)))
                ),
                "should reject {name:?}"
            );
        }
    }

    #[tokio::test]
    async fn non_artifact_suffix_rejected() {
        let (_dir, _store, ingestor) = ingestor().await;
        for name in ["APKINDEX.tar.gz", "hello.tar", "notes.txt"] {
            let result = ingestor.ingest(&bucket(), name, fake_apk("x", "1")).await;
            assert!(
                matches!(result, Err(ApiError::BadRequest(_))),
                "should reject {name}"
            );
        }
    }
}
