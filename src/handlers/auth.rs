use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use tower_cookies::{Cookie, Cookies};
use tower_cookies::cookie::SameSite;
use tower_cookies::cookie::time::Duration;

use crate::{
    error::Result,
    services::identity::ACCESS_COOKIE,
    state::AppState,
    validation::auth::*,
};

/// The request payload for login and registration.
#[derive(Deserialize, Debug)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

/// The response payload for authentication-related requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

/// Creates the primary session cookie holding a provider-issued token.
fn access_cookie(token: String, max_age_secs: i64) -> Cookie<'static> {
    let mut cookie = Cookie::new(ACCESS_COOKIE, token);
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_path("/");
    cookie.set_max_age(Duration::seconds(max_age_secs));

    let is_production = std::env::var("APP_ENV")
        .unwrap_or_else(|_| "development".to_string()) == "production";
    if is_production {
        cookie.set_secure(true);
    }

    cookie
}

/// Handles login: passes the credentials through to the identity
/// provider and forwards the issued token as the session cookie.
///
/// Rate-limited by the `auth` preset before this handler runs.
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse> {
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    let session = state
        .provider
        .password_login(&payload.email, &payload.password)
        .await?;

    if let Some(token) = session.access_token {
        let max_age = session.expires_in.unwrap_or(3600);
        cookies.add(access_cookie(token, max_age));
        tracing::info!("✅ Login completed for {}", payload.email);
    }

    Ok(Json(AuthResponse {
        success: true,
        message: "Signed in".to_string(),
    }))
}

/// Handles registration through the identity provider.
///
/// Rate-limited by the `auth` preset before this handler runs.
pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(payload): Json<CredentialsRequest>,
) -> Result<impl IntoResponse> {
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    let session = state
        .provider
        .register(&payload.email, &payload.password)
        .await?;

    // Some provider configurations withhold the token until the email is
    // confirmed; in that case no session cookie is set yet.
    let message = if let Some(token) = session.access_token {
        let max_age = session.expires_in.unwrap_or(3600);
        cookies.add(access_cookie(token, max_age));
        tracing::info!("✅ Account registered and signed in: {}", payload.email);
        "Account created".to_string()
    } else {
        tracing::info!("✅ Account registered, confirmation pending: {}", payload.email);
        "Account created, confirm your email to sign in".to_string()
    };

    Ok(Json(AuthResponse {
        success: true,
        message,
    }))
}
