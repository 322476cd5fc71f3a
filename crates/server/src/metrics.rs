//! Prometheus metrics for the Pallet server.
//!
//! # Security Note
//!
//! The `/metrics` endpoint is unauthenticated to allow Prometheus scraping.
//! Metrics carry no per-org data, but they do expose aggregate system usage.
//!
//! **Deployment Requirement**: when enabled, the `/metrics` endpoint MUST be
//! network-restricted to authorized Prometheus scraper IPs only. Enforce this
//! at the infrastructure level (firewall, load balancer, or reverse proxy).

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Ingest metrics
pub static PACKAGES_INGESTED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pallet_packages_ingested_total",
        "Total number of packages accepted for publication",
    )
    .expect("metric creation failed")
});

pub static PACKAGES_REJECTED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pallet_packages_rejected_total",
        "Total number of package uploads rejected before any write",
    )
    .expect("metric creation failed")
});

pub static BYTES_INGESTED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pallet_bytes_ingested_total",
        "Total artifact bytes accepted for publication",
    )
    .expect("metric creation failed")
});

// Index rebuild metrics
pub static INDEX_REBUILDS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pallet_index_rebuilds_total",
        "Total number of index rebuild attempts",
    )
    .expect("metric creation failed")
});

pub static INDEX_REBUILD_FAILURES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pallet_index_rebuild_failures_total",
        "Total number of failed index rebuilds",
    )
    .expect("metric creation failed")
});

pub static INDEX_REBUILDS_ACTIVE: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "pallet_index_rebuilds_active",
        "Number of index rebuilds currently running",
    )
    .expect("metric creation failed")
});

pub static INDEX_REBUILD_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "pallet_index_rebuild_duration_seconds",
            "Time taken to rebuild and publish one index",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]),
    )
    .expect("metric creation failed")
});

// Auth metrics
pub static AUTH_FAILURES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "pallet_auth_failures_total",
        "Total number of rejected authorization attempts",
    )
    .expect("metric creation failed")
});

static REGISTER: Once = Once::new();

/// Register all metrics with the global registry. Idempotent.
pub fn register_metrics() {
    REGISTER.call_once(|| {
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(PACKAGES_INGESTED.clone()),
            Box::new(PACKAGES_REJECTED.clone()),
            Box::new(BYTES_INGESTED.clone()),
            Box::new(INDEX_REBUILDS.clone()),
            Box::new(INDEX_REBUILD_FAILURES.clone()),
            Box::new(INDEX_REBUILDS_ACTIVE.clone()),
            Box::new(INDEX_REBUILD_DURATION.clone()),
            Box::new(AUTH_FAILURES.clone()),
        ];
        for collector in collectors {
            if let Err(e) = REGISTRY.register(collector) {
                tracing::warn!(error = %e, "failed to register metric");
            }
        }
    });
}

/// Handler for the /metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, String::new()).into_response();
    }
    (
        StatusCode::OK,
        [("content-type", encoder.format_type().to_string())],
        buffer,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_is_idempotent() {
        register_metrics();
        register_metrics();
        PACKAGES_INGESTED.inc();
        assert!(PACKAGES_INGESTED.get() >= 1);
    }
}
