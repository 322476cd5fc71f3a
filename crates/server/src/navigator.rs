//! Namespace navigation over the package tree.
//!
//! All listings read the store directly; there is no cached view of the
//! tree. Directory order is exposed as-is.

use crate::error::{ApiError, ApiResult};
use pallet_core::hierarchy::{HierarchyPath, Segment, STATIC_PREFIX};
use pallet_core::{Package, ARTIFACT_SUFFIX};
use pallet_storage::HierarchyStore;
use serde::Serialize;
use std::sync::Arc;

/// An organization, as returned by the org endpoints.
#[derive(Clone, Debug, Serialize)]
pub struct OrgInfo {
    pub name: String,
}

/// A repository, as returned by the repo info endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct RepoInfo {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Read-only navigation over the org/distro/version/repo/arch tree.
pub struct Navigator {
    store: Arc<dyn HierarchyStore>,
}

impl Navigator {
    pub fn new(store: Arc<dyn HierarchyStore>) -> Self {
        Self { store }
    }

    async fn subdirs(&self, prefix: &str) -> ApiResult<Vec<String>> {
        let entries = self.store.list(prefix).await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.is_dir)
            .map(|e| e.name)
            .collect())
    }

    fn org_dir(org: &Segment) -> String {
        format!("{STATIC_PREFIX}/{org}")
    }

    /// Check whether an org directory exists under the package tree.
    pub async fn org_exists(&self, org: &Segment) -> ApiResult<bool> {
        Ok(self.store.exists(&Self::org_dir(org)).await?)
    }

    async fn ensure_org(&self, org: &Segment) -> ApiResult<()> {
        if self.org_exists(org).await? {
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("org not found: {org}")))
        }
    }

    /// List all organizations.
    pub async fn list_orgs(&self) -> ApiResult<Vec<String>> {
        self.subdirs(STATIC_PREFIX).await
    }

    /// Get one organization. Absent orgs are a 404, not an empty body.
    pub async fn get_org(&self, org: &Segment) -> ApiResult<OrgInfo> {
        self.ensure_org(org).await?;
        Ok(OrgInfo {
            name: org.to_string(),
        })
    }

    /// List the distros under an org.
    pub async fn list_distros(&self, org: &Segment) -> ApiResult<Vec<String>> {
        self.ensure_org(org).await?;
        self.subdirs(&Self::org_dir(org)).await
    }

    /// List the versions of a distro.
    pub async fn list_versions(&self, org: &Segment, distro: &Segment) -> ApiResult<Vec<String>> {
        self.ensure_org(org).await?;
        self.subdirs(&format!("{}/{distro}", Self::org_dir(org))).await
    }

    /// List the repos of a distro version. An org that exists but has no
    /// matching subtree yields an empty list; an absent org is NotFound.
    pub async fn list_repos(
        &self,
        org: &Segment,
        distro: &Segment,
        version: &Segment,
    ) -> ApiResult<Vec<String>> {
        self.ensure_org(org).await?;
        self.subdirs(&format!("{}/{distro}/{version}", Self::org_dir(org)))
            .await
    }

    /// Get one repo. Absent repo directories are a 404.
    pub async fn repo_info(
        &self,
        org: &Segment,
        distro: &Segment,
        version: &Segment,
        repo: &Segment,
    ) -> ApiResult<RepoInfo> {
        self.ensure_org(org).await?;
        let dir = format!("{}/{distro}/{version}/{repo}", Self::org_dir(org));
        if !self.store.exists(&dir).await? {
            return Err(ApiError::NotFound(format!("repo not found: {repo}")));
        }
        Ok(RepoInfo {
            name: repo.to_string(),
            description: None,
        })
    }

    /// List the architecture buckets of a repo.
    pub async fn list_arches(
        &self,
        org: &Segment,
        distro: &Segment,
        version: &Segment,
        repo: &Segment,
    ) -> ApiResult<Vec<String>> {
        self.ensure_org(org).await?;
        self.subdirs(&format!("{}/{distro}/{version}/{repo}", Self::org_dir(org)))
            .await
    }

    /// List the packages in an architecture bucket. Only files carrying the
    /// artifact suffix are packages; the index and anything else is skipped.
    pub async fn list_packages(&self, path: &HierarchyPath) -> ApiResult<Vec<Package>> {
        self.ensure_org(path.org()).await?;
        let entries = self.store.list(&path.packages_dir()).await?;
        Ok(entries
            .into_iter()
            .filter(|e| !e.is_dir && e.name.ends_with(ARTIFACT_SUFFIX))
            .filter_map(|e| Package::from_file_name(&e.name))
            .collect())
    }
}
