use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::Utc;
use tower_cookies::Cookies;

use crate::{
    error::{AppError, Result},
    handlers::auth::AuthResponse,
    models::identity::Identity,
    services::elevation::ElevationManager,
    state::AppState,
};

/// Establishes the secondary admin session.
///
/// The caller must already hold a valid primary identity matching the
/// fixed admin email; the credential form that precedes this call lives
/// outside the gateway. Elevation is single-shot: it expires 8 hours
/// after issuance regardless of activity.
pub async fn elevate(
    State(state): State<AppState>,
    Extension(identity): Extension<Option<Identity>>,
    cookies: Cookies,
) -> Result<impl IntoResponse> {
    let identity = identity.ok_or(AppError::AuthenticationMissing)?;
    if !identity.is_admin(&state.config.admin_email) {
        return Err(AppError::AuthorizationDenied);
    }

    state
        .audit
        .with_logging("admin.elevate", Some(identity.id), async {
            let value = state.elevation.issue(Utc::now());
            cookies.add(ElevationManager::cookie(value));
            tracing::info!("🔐 Admin elevation issued for {}", identity.id);
            Ok(())
        })
        .await?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Admin session established".to_string(),
    }))
}

/// Drops the secondary admin session. The primary session is untouched.
///
/// Gated like `elevate`: only the admin identity may drive this endpoint.
pub async fn drop_elevation(
    State(state): State<AppState>,
    Extension(identity): Extension<Option<Identity>>,
    cookies: Cookies,
) -> Result<impl IntoResponse> {
    let identity = identity.ok_or(AppError::AuthenticationMissing)?;
    if !identity.is_admin(&state.config.admin_email) {
        return Err(AppError::AuthorizationDenied);
    }

    state
        .audit
        .with_logging("admin.drop_elevation", Some(identity.id), async {
            ElevationManager::clear(&cookies);
            Ok(())
        })
        .await?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Admin session cleared".to_string(),
    }))
}
