use crate::error::{AppError, Result};
use crate::models::gallery::CreateGalleryRequest;

/// Validates a human-chosen gallery slug: lowercase alphanumeric and
/// hyphens, 3-64 characters, no leading/trailing hyphen.
pub fn validate_slug(slug: &str) -> Result<()> {
    if slug.len() < 3 || slug.len() > 64 {
        return Err(AppError::Validation(
            "Slug must be between 3 and 64 characters".to_string(),
        ));
    }

    if !slug
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(AppError::Validation(
            "Slug can only contain lowercase letters, numbers, and hyphens".to_string(),
        ));
    }

    if slug.starts_with('-') || slug.ends_with('-') {
        return Err(AppError::Validation(
            "Slug cannot start or end with a hyphen".to_string(),
        ));
    }

    Ok(())
}

/// Validates a gallery creation payload. Plan ceilings are enforced by
/// the quota layer; this only rejects nonsensical shapes.
pub fn validate_create_gallery(request: &CreateGalleryRequest) -> Result<()> {
    validate_slug(&request.slug)?;

    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title cannot be empty".to_string()));
    }

    if request.title.len() > 120 {
        return Err(AppError::Validation(
            "Title must be at most 120 characters".to_string(),
        ));
    }

    if request.photo_limit < 1 {
        return Err(AppError::Validation(
            "Photo capacity must be at least 1".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(slug: &str, title: &str, photo_limit: i32) -> CreateGalleryRequest {
        CreateGalleryRequest {
            slug: slug.to_string(),
            title: title.to_string(),
            photo_limit,
        }
    }

    #[test]
    fn accepts_normal_slugs() {
        for slug in ["portraits", "summer-2026", "a1b"] {
            assert!(validate_slug(slug).is_ok(), "rejected {:?}", slug);
        }
    }

    #[test]
    fn rejects_bad_slugs() {
        for slug in ["ab", "Portraits", "summer_2026", "-edge", "edge-", "a b"] {
            assert!(validate_slug(slug).is_err(), "accepted {:?}", slug);
        }
    }

    #[test]
    fn rejects_bad_payloads() {
        assert!(validate_create_gallery(&request("portraits", "  ", 10)).is_err());
        assert!(validate_create_gallery(&request("portraits", "Portraits", 0)).is_err());
        assert!(validate_create_gallery(&request("portraits", "Portraits", 10)).is_ok());
    }
}
