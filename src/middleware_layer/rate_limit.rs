use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::net::SocketAddr;

use crate::{
    error::AppError,
    services::ratelimit::RateLimitPreset,
    state::AppState,
};

/// Derives the client identifier for rate-limit keys.
///
/// Prefers the proxy-supplied `x-forwarded-for` hop, then `x-real-ip`,
/// then the socket peer address. Callers behind the same proxy without
/// forwarding headers collapse onto the `"unknown"` bucket.
pub fn client_ip(req: &Request<Body>) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return forwarded.to_string();
    }

    if let Some(real_ip) = req
        .headers()
        .get("x-real-ip")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        return real_ip.to_string();
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// A middleware that throttles sensitive unauthenticated operations
/// (login/registration) per client IP, before any business logic runs.
pub async fn rate_limit_auth(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let ip = client_ip(&req);
    let key = format!("auth:{}", ip);

    match state
        .limiter
        .check_preset(RateLimitPreset::Auth, &key, Utc::now())
        .await
    {
        Ok(decision) if !decision.allowed => {
            AppError::RateLimitExceeded(format!(
                "Too many attempts. Try again in {} seconds",
                decision.reset_in_seconds
            ))
            .into_response()
        }
        Ok(_) => next.run(req).await,
        Err(e) => {
            // A rate-store outage fails open rather than locking out the
            // whole auth surface.
            tracing::error!("Rate-limit store error, failing open: {}", e);
            next.run(req).await
        }
    }
}
