//! HTTP request handlers.

pub mod common;
pub mod packages;
pub mod tree;

pub use common::{ping, ready};
pub use packages::{download_artifact, list_packages, rebuild_index, upload_package};
pub use tree::{get_org, get_repo, list_arches, list_distros, list_orgs, list_repos, list_versions};
