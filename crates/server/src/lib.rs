//! HTTP API server for the Pallet package repository.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod index;
pub mod ingest;
pub mod metrics;
pub mod navigator;
pub mod rebuild;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
