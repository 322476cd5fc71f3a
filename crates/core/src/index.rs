//! Index structure, text rendering and archive assembly.
//!
//! The published `APKINDEX.tar.gz` is two gzip streams back to back: a
//! signature segment (a tar holding one `.SIGN.*` entry, with the tar
//! end-of-archive trailer stripped) followed by the control segment (a
//! complete tar.gz holding `APKINDEX` and `DESCRIPTION`). The signature is
//! computed over the control segment bytes, so clients can verify the
//! archive they actually downloaded.

use crate::error::{Error, Result};
use crate::package::PackageMeta;
use flate2::Compression;
use flate2::write::GzEncoder;
use std::io::Write;

/// One package's entry in the index.
#[derive(Clone, Debug)]
pub struct IndexEntry {
    pub meta: PackageMeta,
    /// Artifact file size in bytes.
    pub size: u64,
}

/// In-memory representation of an architecture bucket's index.
#[derive(Clone, Debug, Default)]
pub struct ApkIndex {
    pub description: String,
    pub packages: Vec<IndexEntry>,
}

impl ApkIndex {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            packages: Vec::new(),
        }
    }

    pub fn push(&mut self, meta: PackageMeta, size: u64) {
        self.packages.push(IndexEntry { meta, size });
    }

    /// Render the line-oriented APKINDEX text: one single-letter field per
    /// line, blank line between entries.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.packages {
            let meta = &entry.meta;
            push_field(&mut out, 'P', Some(&meta.name));
            push_field(&mut out, 'V', Some(&meta.version));
            push_field(&mut out, 'A', meta.arch.as_deref());
            push_field(&mut out, 'S', Some(&entry.size.to_string()));
            push_field(
                &mut out,
                'I',
                meta.installed_size.map(|s| s.to_string()).as_deref(),
            );
            push_field(&mut out, 'T', meta.description.as_deref());
            push_field(&mut out, 'U', meta.url.as_deref());
            push_field(&mut out, 'L', meta.license.as_deref());
            push_field(&mut out, 'o', meta.origin.as_deref());
            push_field(&mut out, 'm', meta.maintainer.as_deref());
            if !meta.depends.is_empty() {
                push_field(&mut out, 'D', Some(&meta.depends.join(" ")));
            }
            out.push('\n');
        }
        out
    }

    /// Build the control segment: a complete tar.gz containing the rendered
    /// `APKINDEX` and the `DESCRIPTION` line.
    pub fn build_control_archive(&self) -> Result<Vec<u8>> {
        let mut builder = tar::Builder::new(Vec::new());
        append_file(&mut builder, "APKINDEX", self.render().as_bytes())?;
        append_file(&mut builder, "DESCRIPTION", self.description.as_bytes())?;
        let tar_bytes = builder
            .into_inner()
            .map_err(|e| Error::Index(format!("finishing control tar: {e}")))?;
        gzip(&tar_bytes)
    }
}

fn push_field(out: &mut String, tag: char, value: Option<&str>) {
    if let Some(value) = value {
        out.push(tag);
        out.push(':');
        out.push_str(value);
        out.push('\n');
    }
}

/// Prepend a signature segment to a control archive, producing the final
/// publishable bytes. `sig_name` is the in-archive entry name (e.g.
/// `.SIGN.ED25519.acme.pub`).
pub fn attach_signature(control: &[u8], sig_name: &str, signature: &[u8]) -> Result<Vec<u8>> {
    let mut builder = tar::Builder::new(Vec::new());
    append_file(&mut builder, sig_name, signature)?;
    let tar_bytes = builder
        .into_inner()
        .map_err(|e| Error::Index(format!("finishing signature tar: {e}")))?;

    // The signature segment must not carry the tar end-of-archive trailer
    // (two 512-byte zero blocks); only the final segment keeps it.
    let trimmed = tar_bytes
        .len()
        .checked_sub(1024)
        .ok_or_else(|| Error::Index("signature tar shorter than trailer".to_string()))?;

    let mut out = gzip(&tar_bytes[..trimmed])?;
    out.extend_from_slice(control);
    Ok(out)
}

fn append_file(builder: &mut tar::Builder<Vec<u8>>, name: &str, data: &[u8]) -> Result<()> {
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, name, data)
        .map_err(|e| Error::Index(format!("appending {name}: {e}")))
}

fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut gz = GzEncoder::new(Vec::new(), Compression::default());
    gz.write_all(data)
        .map_err(|e| Error::Index(format!("gzip: {e}")))?;
    gz.finish().map_err(|e| Error::Index(format!("gzip: {e}")))
}
