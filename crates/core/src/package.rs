//! Package metadata types.

use serde::Serialize;

/// Metadata decoded from a package's embedded `.PKGINFO`.
///
/// `version` carries the combined version-release string the format uses
/// (e.g. `1.2.3-r0`); there is no separate release field on disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PackageMeta {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainer: Option<String>,
    /// Installed size in bytes, as declared by the package.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installed_size: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub depends: Vec<String>,
}

/// A package entry as listed from an architecture directory.
///
/// Listing only looks at file names; `version` is `None` when the name
/// does not follow the `name-version-rN.apk` convention.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Package {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub file_name: String,
}

impl Package {
    /// Parse a directory entry name. Returns `None` for files that are not
    /// package artifacts (wrong suffix), including the index archive itself.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix(crate::ARTIFACT_SUFFIX)?;

        // Convention: <name>-<version>-r<N>. The name itself may contain
        // dashes, so split from the right.
        let mut parts = stem.rsplitn(3, '-');
        let release = parts.next()?;
        let version = parts.next();
        let name = parts.next();

        match (name, version) {
            (Some(name), Some(version)) if release.starts_with('r') && !name.is_empty() => {
                Some(Self {
                    name: name.to_string(),
                    version: Some(format!("{version}-{release}")),
                    file_name: file_name.to_string(),
                })
            }
            _ => Some(Self {
                name: stem.to_string(),
                version: None,
                file_name: file_name.to_string(),
            }),
        }
    }
}
