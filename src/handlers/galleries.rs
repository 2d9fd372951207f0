use axum::{
    Extension, Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    error::{AppError, Result},
    models::activity::ActivityStatus,
    models::gallery::CreateGalleryRequest,
    models::identity::Identity,
    services::quota,
    state::AppState,
    validation::galleries::validate_create_gallery,
};

/// Handles gallery creation: quota-enforced, audit-logged.
///
/// Denials come back as `{success:false, error}` with a specific reason;
/// callers branch only on `success`.
pub async fn create_gallery(
    State(state): State<AppState>,
    Extension(identity): Extension<Option<Identity>>,
    Json(payload): Json<CreateGalleryRequest>,
) -> Result<Response> {
    validate_create_gallery(&payload)?;

    let started = std::time::Instant::now();
    let result = quota::create_gallery(
        state.store.as_ref(),
        &state.cache,
        identity.as_ref(),
        &payload,
        Utc::now(),
    )
    .await;

    // A hard store failure is a guarded operation completing too: record
    // it before re-raising.
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            state
                .audit
                .record(
                    identity.as_ref().map(|id| id.id),
                    "gallery.create",
                    ActivityStatus::Failure,
                    Some(sonic_rs::json!({
                        "slug": payload.slug,
                        "photo_limit": payload.photo_limit,
                    })),
                    Some(e.to_string()),
                    Some(started.elapsed().as_millis() as i64),
                )
                .await;
            return Err(e);
        }
    };

    let status = if outcome.success {
        ActivityStatus::Success
    } else {
        ActivityStatus::Failure
    };
    state
        .audit
        .record(
            identity.as_ref().map(|id| id.id),
            "gallery.create",
            status,
            Some(sonic_rs::json!({
                "slug": payload.slug,
                "photo_limit": payload.photo_limit,
            })),
            outcome.error.clone(),
            Some(started.elapsed().as_millis() as i64),
        )
        .await;

    Ok(Json(outcome).into_response())
}

/// Lists the caller's galleries, served from the listing cache when warm.
pub async fn list_galleries(
    State(state): State<AppState>,
    Extension(identity): Extension<Option<Identity>>,
) -> Result<Response> {
    let identity = identity.ok_or(AppError::AuthenticationMissing)?;

    if let Some(cached) = state.cache.get(identity.id).await {
        tracing::debug!("Listing cache hit for {}", identity.id);
        return Ok(([(header::CONTENT_TYPE, "application/json")], cached).into_response());
    }

    let galleries = state.store.list_galleries(identity.id).await?;
    let json = sonic_rs::to_string(&galleries)
        .map_err(|e| AppError::Internal(format!("Listing serialization failed: {}", e)))?;

    state.cache.put(identity.id, &json).await;

    Ok(([(header::CONTENT_TYPE, "application/json")], json).into_response())
}

/// Returns the caller's current quota standing.
pub async fn quota_info(
    State(state): State<AppState>,
    Extension(identity): Extension<Option<Identity>>,
) -> Result<Response> {
    let identity = identity.ok_or(AppError::AuthenticationMissing)?;

    let profile = state
        .store
        .fetch_profile(identity.id)
        .await?
        .ok_or(AppError::NotFound)?;

    let body = sonic_rs::json!({
        "tier": profile.quota.tier,
        "max_galleries": profile.quota.tier.max_galleries(),
        "max_photos_per_gallery": profile.quota.tier.max_photos_per_gallery(),
        "galleries_remaining": profile.quota.galleries_remaining,
        "expires_at": profile.quota.expires_at.map(|t| t.to_rfc3339()),
        "restricted": profile.quota.is_restricted(Utc::now()),
    });

    Ok(Json(body).into_response())
}
