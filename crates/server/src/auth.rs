//! Authentication and authorization.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Path, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use pallet_core::hierarchy::{tokens_dir, Segment};
use pallet_storage::HierarchyStore;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;

/// Validates presented credentials against per-org token files.
///
/// Tokens live as individual files under the org's config subtree and are
/// read fresh on every authorization decision, so operators can rotate
/// credentials by editing files without a restart.
pub struct TokenAuthority {
    store: Arc<dyn HierarchyStore>,
}

impl TokenAuthority {
    /// Create a new authority backed by the given store.
    pub fn new(store: Arc<dyn HierarchyStore>) -> Self {
        Self { store }
    }

    /// Read the set of valid tokens for an org.
    ///
    /// Each file under the org's token directory contributes one token:
    /// its content with surrounding whitespace trimmed. Files that trim to
    /// empty are skipped. An org with no token directory has no valid
    /// tokens.
    pub async fn valid_tokens(&self, org: &Segment) -> ApiResult<Vec<String>> {
        let dir = tokens_dir(org);
        let mut tokens = Vec::new();
        for entry in self.store.list(&dir).await? {
            if entry.is_dir {
                continue;
            }
            let content = self.store.get(&format!("{dir}/{}", entry.name)).await?;
            let token = String::from_utf8_lossy(&content).trim().to_string();
            if !token.is_empty() {
                tokens.push(token);
            }
        }
        Ok(tokens)
    }

    /// Check a presented credential against the org's valid tokens.
    pub async fn authorize(&self, org: &Segment, presented: &str) -> ApiResult<()> {
        let presented_digest = digest(presented);
        for token in self.valid_tokens(org).await? {
            // Digest comparison keeps the check fixed-length regardless
            // of token length.
            if digest(&token) == presented_digest {
                return Ok(());
            }
        }
        crate::metrics::AUTH_FAILURES.inc();
        Err(ApiError::Unauthorized("invalid token".to_string()))
    }
}

fn digest(token: &str) -> [u8; 32] {
    Sha256::digest(token.as_bytes()).into()
}

/// Extract bearer token from Authorization header.
/// Per RFC 6750, the "Bearer" scheme is case-insensitive.
fn extract_bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            if v.len() >= 7 && v[..7].eq_ignore_ascii_case("bearer ") {
                Some(&v[7..])
            } else {
                None
            }
        })
}

/// Middleware guarding the org-scoped routes.
///
/// The org is taken from the request path; a missing or invalid bearer
/// token for that org rejects the request before any handler runs.
pub async fn auth_middleware(
    State(state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let org = params
        .get("org")
        .ok_or_else(|| ApiError::Internal("auth middleware on route without org".to_string()))?;
    let org = Segment::parse(org).map_err(ApiError::Core)?;

    let token = extract_bearer_token(&req).ok_or_else(|| {
        crate::metrics::AUTH_FAILURES.inc();
        ApiError::Unauthorized("missing bearer token".to_string())
    })?;

    state.authority.authorize(&org, token).await?;

    Ok(next.run(req).await)
}
