//! Core domain types and shared logic for the Pallet package repository.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Hierarchy paths (org/distro/version/repo/arch) and segment validation
//! - Package metadata and artifact filename parsing
//! - The APK package codec
//! - Index structure, text rendering and archive assembly
//! - Configuration types

pub mod apk;
pub mod config;
pub mod error;
pub mod hierarchy;
pub mod index;
pub mod package;

pub use apk::{ApkCodec, PackageCodec};
pub use config::{AppConfig, IndexConfig, ServerConfig, SigningConfig, StorageConfig};
pub use error::{Error, Result};
pub use hierarchy::{HierarchyPath, Segment};
pub use index::{ApkIndex, IndexEntry};
pub use package::{Package, PackageMeta};

/// File suffix for package artifacts.
pub const ARTIFACT_SUFFIX: &str = ".apk";

/// Canonical name of the published index archive.
pub const INDEX_FILE_NAME: &str = "APKINDEX.tar.gz";

/// File suffix for signing key material under an org/distro config directory.
pub const SIGNING_KEY_SUFFIX: &str = ".key";
