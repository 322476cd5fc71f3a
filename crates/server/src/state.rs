//! Application state shared across handlers.

use crate::auth::TokenAuthority;
use crate::index::IndexBuilder;
use crate::ingest::Ingestor;
use crate::navigator::Navigator;
use crate::rebuild::RebuildCoordinator;
use pallet_core::config::AppConfig;
use pallet_core::{ApkCodec, PackageCodec};
use pallet_storage::HierarchyStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Hierarchy store backend.
    pub store: Arc<dyn HierarchyStore>,
    /// Per-org token validation.
    pub authority: Arc<TokenAuthority>,
    /// Read-only tree navigation.
    pub navigator: Arc<Navigator>,
    /// Package upload validation and publication.
    pub ingestor: Arc<Ingestor>,
    /// Index rebuild serialization.
    pub rebuilds: Arc<RebuildCoordinator>,
}

impl AppState {
    /// Wire up all components over one store.
    pub fn new(config: AppConfig, store: Arc<dyn HierarchyStore>) -> Self {
        let codec: Arc<dyn PackageCodec> = Arc::new(ApkCodec);
        let builder = Arc::new(IndexBuilder::new(
            store.clone(),
            codec.clone(),
            config.index.clone(),
            config.signing.clone(),
        ));
        let rebuilds = Arc::new(RebuildCoordinator::new(
            builder,
            config.index.rebuild_timeout(),
        ));

        Self {
            config: Arc::new(config),
            store: store.clone(),
            authority: Arc::new(TokenAuthority::new(store.clone())),
            navigator: Arc::new(Navigator::new(store.clone())),
            ingestor: Arc::new(Ingestor::new(store, codec)),
            rebuilds,
        }
    }
}
