use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A gallery row. The quota layer only ever creates and lists these;
/// photo bytes live in object storage, outside this gateway.
#[derive(Debug, Clone, Serialize)]
pub struct Gallery {
    /// The gallery id.
    pub id: Uuid,
    /// The owning account id.
    pub owner_id: Uuid,
    /// The human-chosen slug, unique across the whole namespace.
    pub slug: String,
    /// The gallery title.
    pub title: String,
    /// The photo capacity the owner requested for this gallery.
    pub photo_limit: i32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// The request payload for gallery creation.
#[derive(Debug, Deserialize)]
pub struct CreateGalleryRequest {
    pub slug: String,
    pub title: String,
    pub photo_limit: i32,
}

/// The result of a gallery creation attempt. Callers branch only on
/// `success`.
#[derive(Debug, Clone, Serialize)]
pub struct CreationOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gallery_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CreationOutcome {
    /// A successful outcome carrying the new gallery id.
    pub fn created(gallery_id: Uuid) -> Self {
        Self {
            success: true,
            gallery_id: Some(gallery_id),
            error: None,
        }
    }

    /// A structured denial.
    pub fn denied(error: String) -> Self {
        Self {
            success: false,
            gallery_id: None,
            error: Some(error),
        }
    }
}
