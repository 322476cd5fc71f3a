//! Hierarchy path types and segment validation.
//!
//! The repository is a fixed five-level tree: org / distro / version /
//! repo / arch. Every segment arriving from the outside world is funneled
//! through [`Segment::parse`] before it is ever used to build a store key;
//! this is the path-traversal boundary for the whole system.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Subtree holding package data, served to package-manager clients.
pub const STATIC_PREFIX: &str = "static";

/// Subtree holding credentials and signing keys. Never served as package
/// data; the split between the two roots is load-bearing.
pub const CONFIG_PREFIX: &str = "config";

/// A single validated hierarchy segment.
///
/// Guaranteed non-empty, free of path separators and of the `.`/`..`
/// traversal components.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Segment(String);

impl Segment {
    /// Validate a raw string as a hierarchy segment.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(Error::InvalidPath("empty segment".to_string()));
        }
        if s == "." || s == ".." {
            return Err(Error::InvalidPath(format!(
                "traversal segment not allowed: {s}"
            )));
        }
        if s.contains('/') || s.contains('\\') || s.contains('\0') {
            return Err(Error::InvalidPath(format!(
                "segment contains path separator or NUL: {s}"
            )));
        }
        Ok(Self(s.to_string()))
    }

    /// Get the segment as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fully-qualified architecture bucket: (org, distro, version, repo, arch).
///
/// Construction validates every segment, so holding a `HierarchyPath` is
/// proof the path is safe to hand to the hierarchy store.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HierarchyPath {
    org: Segment,
    distro: Segment,
    version: Segment,
    repo: Segment,
    arch: Segment,
}

impl HierarchyPath {
    /// Build a path from raw segments, validating each.
    pub fn new(org: &str, distro: &str, version: &str, repo: &str, arch: &str) -> Result<Self> {
        Ok(Self {
            org: Segment::parse(org)?,
            distro: Segment::parse(distro)?,
            version: Segment::parse(version)?,
            repo: Segment::parse(repo)?,
            arch: Segment::parse(arch)?,
        })
    }

    pub fn org(&self) -> &Segment {
        &self.org
    }

    pub fn distro(&self) -> &Segment {
        &self.distro
    }

    pub fn version(&self) -> &Segment {
        &self.version
    }

    pub fn repo(&self) -> &Segment {
        &self.repo
    }

    pub fn arch(&self) -> &Segment {
        &self.arch
    }

    /// Store key of the architecture directory holding package artifacts.
    pub fn packages_dir(&self) -> String {
        format!(
            "{STATIC_PREFIX}/{}/{}/{}/{}/{}",
            self.org, self.distro, self.version, self.repo, self.arch
        )
    }

    /// Store key for one artifact inside this bucket. The file name must
    /// already be validated as a segment by the caller.
    pub fn artifact_key(&self, file_name: &Segment) -> String {
        format!("{}/{file_name}", self.packages_dir())
    }

    /// Store key of the published index archive for this bucket.
    pub fn index_key(&self) -> String {
        format!("{}/{}", self.packages_dir(), crate::INDEX_FILE_NAME)
    }

    /// Store key of the config directory holding this bucket's signing key.
    /// Keys are scoped to (org, distro), shared by all versions and repos.
    pub fn signing_dir(&self) -> String {
        format!("{CONFIG_PREFIX}/{}/{}", self.org, self.distro)
    }
}

impl fmt::Display for HierarchyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.org, self.distro, self.version, self.repo, self.arch
        )
    }
}

/// Store key of an organization's token directory.
pub fn tokens_dir(org: &Segment) -> String {
    format!("{CONFIG_PREFIX}/{org}/tokens")
}
