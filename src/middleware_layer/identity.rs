use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_cookies::Cookies;

use crate::state::AppState;

/// Resolves the caller's identity once per request and stashes it in the
/// request extensions as an `Option<Identity>` for API handlers.
///
/// Requests without a resolvable identity still proceed: which
/// operations require one is decided downstream.
pub async fn resolve_identity(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let identity = state.resolver.resolve(&cookies, req.headers());

    if let Some(ref identity) = identity {
        tracing::debug!("✅ Identity resolved: {}", identity.id);
    }

    req.extensions_mut().insert(identity);
    next.run(req).await
}
