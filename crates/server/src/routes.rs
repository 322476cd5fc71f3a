//! Route configuration.

use crate::auth::auth_middleware;
use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    // Everything under /v1/orgs/{org} requires a bearer token valid for
    // that org; the org listing itself exposes only names and stays open.
    let org_routes = Router::new()
        .route("/", get(handlers::get_org))
        .route("/distros", get(handlers::list_distros))
        .route("/distros/{distro}/versions", get(handlers::list_versions))
        .route(
            "/distros/{distro}/versions/{version}/repos",
            get(handlers::list_repos),
        )
        .route(
            "/distros/{distro}/versions/{version}/repos/{repo}",
            get(handlers::get_repo),
        )
        .route(
            "/distros/{distro}/versions/{version}/repos/{repo}/arches",
            get(handlers::list_arches),
        )
        .route(
            "/distros/{distro}/versions/{version}/repos/{repo}/arches/{arch}/packages",
            get(handlers::list_packages)
                .post(handlers::upload_package)
                // Package artifacts routinely exceed the extractor's stock
                // body cap; the accepted size is an operator decision.
                .layer(DefaultBodyLimit::max(state.config.server.max_upload_bytes)),
        )
        .route(
            "/distros/{distro}/versions/{version}/repos/{repo}/arches/{arch}/index",
            post(handlers::rebuild_index),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Health checks are intentionally unauthenticated for load balancers
    // and orchestration probes. The static tree serves package clients.
    let mut router = Router::new()
        .route("/healthz/ping", get(handlers::ping))
        .route("/healthz/ready", get(handlers::ready))
        .route("/v1/orgs", get(handlers::list_orgs))
        .nest("/v1/orgs/{org}", org_routes)
        .route(
            "/static/{org}/{distro}/{version}/{repo}/{arch}/{file}",
            get(handlers::download_artifact),
        );

    // SECURITY: when enabled, /metrics MUST be network-restricted to
    // authorized Prometheus scraper IPs. See crate::metrics.
    if state.config.server.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
