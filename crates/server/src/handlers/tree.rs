//! Namespace listing handlers.

use crate::error::{ApiError, ApiResult};
use crate::navigator::{OrgInfo, RepoInfo};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::Json;
use pallet_core::Segment;

fn seg(s: &str) -> ApiResult<Segment> {
    Segment::parse(s).map_err(ApiError::Core)
}

/// GET /v1/orgs
pub async fn list_orgs(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.navigator.list_orgs().await?))
}

/// GET /v1/orgs/{org}
pub async fn get_org(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> ApiResult<Json<OrgInfo>> {
    Ok(Json(state.navigator.get_org(&seg(&org)?).await?))
}

/// GET /v1/orgs/{org}/distros
pub async fn list_distros(
    State(state): State<AppState>,
    Path(org): Path<String>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.navigator.list_distros(&seg(&org)?).await?))
}

/// GET /v1/orgs/{org}/distros/{distro}/versions
pub async fn list_versions(
    State(state): State<AppState>,
    Path((org, distro)): Path<(String, String)>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(
        state
            .navigator
            .list_versions(&seg(&org)?, &seg(&distro)?)
            .await?,
    ))
}

/// GET /v1/orgs/{org}/distros/{distro}/versions/{version}/repos
pub async fn list_repos(
    State(state): State<AppState>,
    Path((org, distro, version)): Path<(String, String, String)>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(
        state
            .navigator
            .list_repos(&seg(&org)?, &seg(&distro)?, &seg(&version)?)
            .await?,
    ))
}

/// GET /v1/orgs/{org}/distros/{distro}/versions/{version}/repos/{repo}
pub async fn get_repo(
    State(state): State<AppState>,
    Path((org, distro, version, repo)): Path<(String, String, String, String)>,
) -> ApiResult<Json<RepoInfo>> {
    Ok(Json(
        state
            .navigator
            .repo_info(&seg(&org)?, &seg(&distro)?, &seg(&version)?, &seg(&repo)?)
            .await?,
    ))
}

/// GET /v1/orgs/{org}/distros/{distro}/versions/{version}/repos/{repo}/arches
pub async fn list_arches(
    State(state): State<AppState>,
    Path((org, distro, version, repo)): Path<(String, String, String, String)>,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(
        state
            .navigator
            .list_arches(&seg(&org)?, &seg(&distro)?, &seg(&version)?, &seg(&repo)?)
            .await?,
    ))
}
