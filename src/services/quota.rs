use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    cache::ListingCache,
    error::Result,
    models::gallery::{CreateGalleryRequest, CreationOutcome, Gallery},
    models::identity::Identity,
    models::quota::Profile,
    repositories::store::ProfileStore,
};

/// An enumerated creation denial. Surfaced to callers as a structured
/// `{success:false, error}` result, never an unhandled failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuotaDenial {
    #[error("NotAuthenticated: sign in to create galleries")]
    NotAuthenticated,

    #[error("ProfileNotFound: no account profile for this identity")]
    ProfileNotFound,

    #[error("SubscriptionExpired: the subscription is missing or expired")]
    SubscriptionExpired,

    #[error("PhotoLimitExceeded: this plan allows at most {max_photos} photos per gallery")]
    PhotoLimitExceeded { max_photos: i32 },

    #[error("QuotaExhausted: no gallery slots remaining on this plan")]
    QuotaExhausted,

    #[error("SlugTaken: that gallery address is already in use")]
    SlugTaken,
}

/// The decision for one creation attempt.
#[derive(Debug)]
pub enum CreationDecision {
    Approved(Profile),
    Denied(QuotaDenial),
}

/// Evaluates the creation gates in fixed order; the first failure
/// short-circuits with its specific denial.
///
/// # Arguments
///
/// * `store` - The account/gallery store.
/// * `identity` - The resolved caller, if any.
/// * `slug` - The requested gallery slug.
/// * `requested_photos` - The photo capacity requested for the gallery.
/// * `now` - The evaluation instant.
pub async fn authorize_creation(
    store: &dyn ProfileStore,
    identity: Option<&Identity>,
    slug: &str,
    requested_photos: i32,
    now: DateTime<Utc>,
) -> Result<CreationDecision> {
    // 1. Identity present.
    let Some(identity) = identity else {
        return Ok(CreationDecision::Denied(QuotaDenial::NotAuthenticated));
    };

    // 2. Profile row exists.
    let Some(profile) = store.fetch_profile(identity.id).await? else {
        return Ok(CreationDecision::Denied(QuotaDenial::ProfileNotFound));
    };

    // 3. Account not restricted. Unlimited tiers still expire.
    if profile.quota.is_restricted(now) {
        return Ok(CreationDecision::Denied(QuotaDenial::SubscriptionExpired));
    }

    // 4. Per-gallery photo ceiling, unless unlimited.
    if let Some(max_photos) = profile.quota.tier.max_photos_per_gallery() {
        if requested_photos > max_photos {
            return Ok(CreationDecision::Denied(QuotaDenial::PhotoLimitExceeded {
                max_photos,
            }));
        }
    }

    // 5. Remaining gallery slots, unless unlimited.
    if !profile.quota.tier.is_unlimited() && profile.quota.galleries_remaining <= 0 {
        return Ok(CreationDecision::Denied(QuotaDenial::QuotaExhausted));
    }

    // 6. Slug unique across the whole namespace.
    if store.slug_exists(slug).await? {
        return Ok(CreationDecision::Denied(QuotaDenial::SlugTaken));
    }

    Ok(CreationDecision::Approved(profile))
}

/// Authorizes and performs a gallery creation.
///
/// On approval the gallery row is inserted, then the remaining-slot count
/// is decremented (unless unlimited) as a best-effort follow-up write —
/// the two are independent single-row operations, not one atomic unit.
/// The cached listing for the account is invalidated afterwards.
pub async fn create_gallery(
    store: &dyn ProfileStore,
    cache: &ListingCache,
    identity: Option<&Identity>,
    request: &CreateGalleryRequest,
    now: DateTime<Utc>,
) -> Result<CreationOutcome> {
    let decision =
        authorize_creation(store, identity, &request.slug, request.photo_limit, now).await?;

    let profile = match decision {
        CreationDecision::Denied(denial) => {
            tracing::debug!("Gallery creation denied: {}", denial);
            return Ok(CreationOutcome::denied(denial.to_string()));
        }
        CreationDecision::Approved(profile) => profile,
    };

    let gallery = Gallery {
        id: Uuid::new_v4(),
        owner_id: profile.user_id,
        slug: request.slug.clone(),
        title: request.title.clone(),
        photo_limit: request.photo_limit,
        created_at: now,
    };
    store.insert_gallery(&gallery).await?;

    if !profile.quota.tier.is_unlimited() {
        if let Err(e) = store.decrement_galleries_remaining(profile.user_id).await {
            tracing::error!(
                "Quota decrement failed after gallery insert for {}: {}",
                profile.user_id,
                e
            );
        }
    }

    cache.invalidate(profile.user_id).await;

    tracing::info!("Gallery {} created for {}", gallery.id, profile.user_id);
    Ok(CreationOutcome::created(gallery.id))
}
