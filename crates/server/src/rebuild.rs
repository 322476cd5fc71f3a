//! Per-bucket rebuild serialization and coalescing.

use crate::error::{ApiError, ApiResult};
use crate::index::{IndexBuilder, RebuildReport};
use pallet_core::hierarchy::HierarchyPath;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
struct PathState {
    /// Serializes builds for one bucket. Distinct buckets hold distinct
    /// locks, so they rebuild in parallel.
    lock: Arc<tokio::sync::Mutex<()>>,
    /// Set while a background re-run is queued behind the current build.
    /// Requests arriving while it is set coalesce into that re-run.
    queued: Arc<AtomicBool>,
}

/// Coordinates index rebuilds so that each bucket has at most one build
/// running and at most one queued re-run at any time.
pub struct RebuildCoordinator {
    builder: Arc<IndexBuilder>,
    timeout: Duration,
    /// One entry per bucket ever rebuilt, never evicted. Each entry is a
    /// mutex plus a flag, and the entry count is bounded by the number of
    /// architecture directories in the tree.
    states: Mutex<HashMap<HierarchyPath, PathState>>,
}

impl RebuildCoordinator {
    pub fn new(builder: Arc<IndexBuilder>, timeout: Duration) -> Self {
        Self {
            builder,
            timeout,
            states: Mutex::new(HashMap::new()),
        }
    }

    fn state_for(&self, path: &HierarchyPath) -> PathState {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states
            .entry(path.clone())
            .or_insert_with(|| PathState {
                lock: Arc::new(tokio::sync::Mutex::new(())),
                queued: Arc::new(AtomicBool::new(false)),
            })
            .clone()
    }

    async fn run_once(&self, path: &HierarchyPath) -> ApiResult<RebuildReport> {
        crate::metrics::INDEX_REBUILDS.inc();
        crate::metrics::INDEX_REBUILDS_ACTIVE.inc();
        let timer = crate::metrics::INDEX_REBUILD_DURATION.start_timer();

        let result = match tokio::time::timeout(self.timeout, self.builder.rebuild(path)).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Internal(format!(
                "index rebuild timed out after {:?}",
                self.timeout
            ))),
        };

        timer.observe_duration();
        crate::metrics::INDEX_REBUILDS_ACTIVE.dec();
        if result.is_err() {
            crate::metrics::INDEX_REBUILD_FAILURES.inc();
        }
        result
    }

    /// Rebuild a bucket synchronously, waiting behind any in-flight build.
    pub async fn rebuild_now(&self, path: &HierarchyPath) -> ApiResult<RebuildReport> {
        let state = self.state_for(path);
        let _guard = state.lock.lock().await;
        self.run_once(path).await
    }

    /// Request a background rebuild of a bucket.
    ///
    /// Returns immediately. If a build for this bucket is already queued,
    /// the request coalesces into it; the queued build starts after the
    /// in-flight one (if any) releases the bucket lock, so it observes
    /// every artifact written before it started.
    pub fn schedule(self: &Arc<Self>, path: HierarchyPath) {
        let state = self.state_for(&path);
        if state.queued.swap(true, Ordering::AcqRel) {
            tracing::debug!(bucket = %path, "rebuild already queued, coalescing");
            return;
        }

        let coordinator = self.clone();
        tokio::spawn(async move {
            let _guard = state.lock.lock().await;
            state.queued.store(false, Ordering::Release);
            if let Err(e) = coordinator.run_once(&path).await {
                tracing::error!(bucket = %path, error = %e, "background rebuild failed");
            }
        });
    }
}
