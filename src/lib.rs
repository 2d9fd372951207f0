//! Lumera gateway: per-request access control and quota enforcement for
//! the Lumera photo-sharing platform.
//!
//! Every inbound request passes the route guard; sensitive
//! unauthenticated submissions pass the fixed-window rate limiter; every
//! gallery creation passes the quota enforcer and leaves an audit trail.

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use tower_cookies::CookieManagerLayer;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod state;
pub mod db;
pub mod cache;

pub mod crypto {
    pub mod token;
}

pub mod models {
    pub mod activity;
    pub mod gallery;
    pub mod identity;
    pub mod quota;
}

pub mod repositories {
    pub mod memory;
    pub mod postgres;
    pub mod store;
}

pub mod services {
    pub mod audit;
    pub mod elevation;
    pub mod guard;
    pub mod identity;
    pub mod quota;
    pub mod ratelimit;
}

pub mod middleware_layer {
    pub mod guard;
    pub mod identity;
    pub mod rate_limit;
}

pub mod handlers {
    pub mod admin;
    pub mod auth;
    pub mod galleries;
}

pub mod validation {
    pub mod auth;
    pub mod galleries;
}

use state::AppState;

/// Builds the gateway router.
///
/// Layer order (innermost to outermost): route guard, trace, cookies —
/// the cookie layer must be outermost so every middleware below it can
/// read and write cookies.
pub fn app(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/register", post(handlers::auth::register))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::rate_limit::rate_limit_auth,
        ))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/api/galleries",
            get(handlers::galleries::list_galleries).post(handlers::galleries::create_gallery),
        )
        .route("/api/account/quota", get(handlers::galleries::quota_info))
        .route(
            "/api/admin/session",
            post(handlers::admin::elevate).delete(handlers::admin::drop_elevation),
        )
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::identity::resolve_identity,
        ))
        .with_state(state.clone());

    Router::new()
        .merge(auth_routes)
        .merge(api_routes)
        .fallback_service(ServeDir::new("public"))
        .layer(from_fn_with_state(
            state,
            middleware_layer::guard::route_guard,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CookieManagerLayer::new())
}
