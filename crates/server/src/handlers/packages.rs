//! Package and index handlers.

use crate::error::{ApiError, ApiResult};
use crate::index::RebuildReport;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use pallet_core::hierarchy::HierarchyPath;
use pallet_core::{Package, PackageMeta};

type BucketParams = (String, String, String, String, String);

fn bucket((org, distro, version, repo, arch): &BucketParams) -> ApiResult<HierarchyPath> {
    HierarchyPath::new(org, distro, version, repo, arch).map_err(ApiError::Core)
}

fn multipart_error(context: &str, e: axum::extract::multipart::MultipartError) -> ApiError {
    // Body-limit overruns surface through the multipart reader; keep
    // their status instead of flattening everything to 400.
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!("{context}: {e}"))
    } else {
        ApiError::BadRequest(format!("{context}: {e}"))
    }
}

/// GET .../arches/{arch}/packages
pub async fn list_packages(
    State(state): State<AppState>,
    Path(params): Path<BucketParams>,
) -> ApiResult<Json<Vec<Package>>> {
    let path = bucket(&params)?;
    Ok(Json(state.navigator.list_packages(&path).await?))
}

/// POST .../arches/{arch}/packages
///
/// Accepts one multipart upload in the `package` form field and schedules
/// a background index rebuild once the artifact is published.
pub async fn upload_package(
    State(state): State<AppState>,
    Path(params): Path<BucketParams>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<PackageMeta>)> {
    let path = bucket(&params)?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("invalid multipart body", e))?
    {
        if field.name() != Some("package") {
            continue;
        }
        let file_name = field
            .file_name()
            .ok_or_else(|| ApiError::BadRequest("package field has no file name".to_string()))?
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error("reading upload", e))?;

        let meta = state.ingestor.ingest(&path, &file_name, data).await?;
        state.rebuilds.schedule(path);
        return Ok((StatusCode::CREATED, Json(meta)));
    }

    Err(ApiError::BadRequest(
        "missing multipart field: package".to_string(),
    ))
}

/// POST .../arches/{arch}/index
///
/// Rebuilds the bucket's index synchronously and reports the outcome.
pub async fn rebuild_index(
    State(state): State<AppState>,
    Path(params): Path<BucketParams>,
) -> ApiResult<Json<RebuildReport>> {
    let path = bucket(&params)?;
    Ok(Json(state.rebuilds.rebuild_now(&path).await?))
}

/// GET /static/{org}/{distro}/{version}/{repo}/{arch}/{file}
///
/// Streams one published file (artifact or index) to package clients.
pub async fn download_artifact(
    State(state): State<AppState>,
    Path((org, distro, version, repo, arch, file)): Path<(
        String,
        String,
        String,
        String,
        String,
        String,
    )>,
) -> ApiResult<Response> {
    let path = bucket(&(org, distro, version, repo, arch))?;
    let file = pallet_core::Segment::parse(&file).map_err(ApiError::Core)?;
    let key = path.artifact_key(&file);

    let stream = state.store.get_stream(&key).await?;
    let body = Body::from_stream(stream);
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        body,
    )
        .into_response())
}
