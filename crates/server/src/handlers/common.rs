//! Health endpoints for orchestration probes.

use crate::error::ApiResult;
use crate::state::AppState;
use axum::extract::State;
use axum::Json;
use serde_json::json;

/// Liveness probe. Always succeeds while the process is serving.
pub async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness probe. Fails when the backing store is unreachable.
pub async fn ready(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    state.store.health_check().await?;
    Ok(Json(json!({ "status": "ready" })))
}
