use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The gateway's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// A database pool error.
    #[error("Database pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A database pool build error.
    #[error("Database pool build error: {0}")]
    PoolBuild(#[from] deadpool_postgres::CreatePoolError),

    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// The identity provider could not be reached or answered abnormally.
    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    /// An authentication error with a caller-visible message.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// No resolvable identity on a request that requires one.
    #[error("Authentication required")]
    AuthenticationMissing,

    /// Identity present but lacking the required role or elevation.
    #[error("Authorization failed")]
    AuthorizationDenied,

    /// A resource not found error.
    #[error("Resource not found")]
    NotFound,

    /// A validation error.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A rate limit exceeded error.
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Postgres(ref e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Pool(ref e) => {
                tracing::error!("Database pool error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::PoolBuild(ref e) => {
                tracing::error!("Database pool build error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }

            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Cache error".to_string())
            }

            AppError::IdentityProvider(ref msg) => {
                tracing::error!("Identity provider error: {}", msg);
                (StatusCode::BAD_GATEWAY, "Identity provider unavailable".to_string())
            }

            AppError::Authentication(ref msg) => {
                tracing::warn!("Authentication failed: {}", msg);
                (StatusCode::UNAUTHORIZED, msg.clone())
            }

            AppError::AuthenticationMissing => {
                tracing::debug!("Authentication required");
                (StatusCode::UNAUTHORIZED, "Authentication required".to_string())
            }

            AppError::AuthorizationDenied => {
                tracing::warn!("Authorization failed");
                (StatusCode::FORBIDDEN, "Forbidden".to_string())
            }

            AppError::NotFound => {
                tracing::debug!("Resource not found");
                (StatusCode::NOT_FOUND, "Resource not found".to_string())
            }

            AppError::Validation(ref msg) => {
                tracing::debug!("Validation error: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }

            AppError::RateLimitExceeded(ref msg) => {
                tracing::warn!("Rate limit exceeded: {}", msg);
                (StatusCode::TOO_MANY_REQUESTS, msg.clone())
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "success": false,
            "error": message
        }))
        .unwrap_or_else(|_| r#"{"success":false,"error":"Internal server error"}"#.to_string());

        (status, body).into_response()
    }
}
