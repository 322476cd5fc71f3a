//! Package artifact decoding.
//!
//! An `.apk` artifact is a concatenation of gzip-compressed tar segments
//! (optional signature, control, data). Only the final segment carries the
//! tar end-of-archive marker, so a multi-member gzip reader feeding a single
//! tar reader walks straight through segment boundaries; the control
//! segment's `.PKGINFO` entry is the one we care about.

use crate::error::{Error, Result};
use crate::package::PackageMeta;
use flate2::read::MultiGzDecoder;
use std::io::Read;

/// Maximum size of a `.PKGINFO` entry we are willing to read (1 MiB).
/// Real control files are a few hundred bytes.
const MAX_PKGINFO_SIZE: u64 = 1024 * 1024;

/// Decodes raw artifact bytes into package metadata.
///
/// Injectable so the ingestion and index paths are testable without real
/// packages; [`ApkCodec`] is the production implementation.
pub trait PackageCodec: Send + Sync + 'static {
    /// Decode an artifact, failing with `MalformedPackage` when the bytes
    /// are not a well-formed package.
    fn decode(&self, bytes: &[u8]) -> Result<PackageMeta>;
}

/// Production codec for the APK v2 format.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApkCodec;

impl PackageCodec for ApkCodec {
    fn decode(&self, bytes: &[u8]) -> Result<PackageMeta> {
        let gz = MultiGzDecoder::new(bytes);
        let mut archive = tar::Archive::new(gz);

        let entries = archive
            .entries()
            .map_err(|e| Error::MalformedPackage(format!("not a tar archive: {e}")))?;

        for entry in entries {
            let mut entry =
                entry.map_err(|e| Error::MalformedPackage(format!("corrupt tar entry: {e}")))?;
            let path = entry
                .path()
                .map_err(|e| Error::MalformedPackage(format!("bad entry path: {e}")))?;

            if path.as_ref() == std::path::Path::new(".PKGINFO") {
                if entry.size() > MAX_PKGINFO_SIZE {
                    return Err(Error::MalformedPackage(format!(
                        ".PKGINFO too large: {} bytes",
                        entry.size()
                    )));
                }
                let mut text = String::new();
                entry
                    .read_to_string(&mut text)
                    .map_err(|e| Error::MalformedPackage(format!("unreadable .PKGINFO: {e}")))?;
                return parse_pkginfo(&text);
            }
        }

        Err(Error::MalformedPackage(
            "no .PKGINFO entry found".to_string(),
        ))
    }
}

/// Parse the `key = value` lines of a `.PKGINFO` file.
fn parse_pkginfo(text: &str) -> Result<PackageMeta> {
    let mut name = None;
    let mut version = None;
    let mut meta = PackageMeta {
        name: String::new(),
        version: String::new(),
        description: None,
        url: None,
        arch: None,
        license: None,
        origin: None,
        maintainer: None,
        installed_size: None,
        depends: Vec::new(),
    };

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "pkgname" => name = Some(value.to_string()),
            "pkgver" => version = Some(value.to_string()),
            "pkgdesc" => meta.description = Some(value.to_string()),
            "url" => meta.url = Some(value.to_string()),
            "arch" => meta.arch = Some(value.to_string()),
            "license" => meta.license = Some(value.to_string()),
            "origin" => meta.origin = Some(value.to_string()),
            "maintainer" => meta.maintainer = Some(value.to_string()),
            "size" => meta.installed_size = value.parse().ok(),
            "depend" => meta.depends.push(value.to_string()),
            _ => {}
        }
    }

    meta.name = name.ok_or_else(|| Error::MalformedPackage("missing pkgname".to_string()))?;
    meta.version = version.ok_or_else(|| Error::MalformedPackage("missing pkgver".to_string()))?;
    Ok(meta)
}
