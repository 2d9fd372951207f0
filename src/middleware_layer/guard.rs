use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tower_cookies::Cookies;

use crate::{
    services::elevation::{ADMIN_SESSION_COOKIE, ElevationManager},
    services::guard::{self, RouteVerdict},
    state::AppState,
};

/// The per-request route guard.
///
/// Resolves auth state, evaluates the protection policy, and either runs
/// the handler or redirects without executing it. Static assets bypass
/// evaluation entirely.
pub async fn route_guard(
    State(state): State<AppState>,
    cookies: Cookies,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    if guard::is_static_asset(&path) {
        return next.run(req).await;
    }

    let now = Utc::now();

    // Resolution failures are already normalized to "no identity"; the
    // guard never hard-fails a request.
    let identity = state.resolver.resolve(&cookies, req.headers());

    let elevation_cookie = cookies
        .get(ADMIN_SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string());
    let elevation = state.elevation.status(elevation_cookie.as_deref(), now);

    match guard::evaluate(
        &path,
        identity.as_ref(),
        &elevation,
        &state.config.admin_email,
    ) {
        RouteVerdict::Allow => next.run(req).await,
        RouteVerdict::Redirect {
            location,
            clear_elevation,
        } => {
            if clear_elevation {
                tracing::warn!("❌ Admin check failed for {}, clearing elevation", path);
                ElevationManager::clear(&cookies);
            } else {
                tracing::debug!("Redirecting {} to {}", path, location);
            }
            Redirect::temporary(location).into_response()
        }
    }
}
