use crate::error::{AppError, Result};

/// Validates an email address shape before it reaches the identity
/// provider. The provider remains the authority; this only rejects the
/// obviously malformed.
pub fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() || email.len() > 255 {
        return Err(AppError::Validation(
            "Email must be between 1 and 255 characters".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(AppError::Validation("Email must contain '@'".to_string()));
    };

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(AppError::Validation("Email is not valid".to_string()));
    }

    Ok(())
}

/// Validates a password.
///
/// # Arguments
///
/// * `password` - The password to validate.
///
/// # Returns
///
/// A `Result<()>` indicating whether the password is valid.
pub fn validate_password(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be at most 128 characters".to_string(),
        ));
    }

    Ok(())
}
