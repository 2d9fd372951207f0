use std::env;
use anyhow::{Context, Result};
use zeroize::{Zeroize, Zeroizing};

/// The gateway's configuration.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the external identity provider.
    pub identity_provider_url: String,
    /// Shared secret used to verify provider-issued access tokens (HS256).
    pub identity_jwt_secret: Zeroizing<String>,
    /// Service-role credential for server-side calls to the provider.
    /// Never exposed to callers.
    pub identity_service_key: Zeroizing<String>,
    /// The single allowed admin email, compared case-sensitively.
    pub admin_email: String,
    /// 32-byte key used to sign admin elevation cookies.
    pub elevation_key: Zeroizing<Vec<u8>>,
    /// PostgreSQL URL. When absent the in-memory store is used.
    pub database_url: Option<String>,
    /// Redis URL. When absent rate limiting stays process-local and the
    /// listing cache is disabled.
    pub redis_url: Option<String>,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let mut elevation_key_hex = env::var("ELEVATION_KEY")
            .context("ELEVATION_KEY must be set (generate with: openssl rand -hex 32)")?;

        let elevation_key_bytes = hex::decode(&elevation_key_hex)
            .context("ELEVATION_KEY must be valid hexadecimal")?;

        elevation_key_hex.zeroize();

        if elevation_key_bytes.len() != 32 {
            anyhow::bail!("ELEVATION_KEY must be exactly 32 bytes (64 hex characters)");
        }

        Ok(Self {
            identity_provider_url: env::var("IDENTITY_PROVIDER_URL")
                .context("IDENTITY_PROVIDER_URL must be set")?,
            identity_jwt_secret: Zeroizing::new(
                env::var("IDENTITY_JWT_SECRET").context("IDENTITY_JWT_SECRET must be set")?,
            ),
            identity_service_key: Zeroizing::new(
                env::var("IDENTITY_SERVICE_KEY").context("IDENTITY_SERVICE_KEY must be set")?,
            ),
            admin_email: env::var("ADMIN_EMAIL").context("ADMIN_EMAIL must be set")?,
            elevation_key: Zeroizing::new(elevation_key_bytes),
            database_url: env::var("DATABASE_URL").ok(),
            redis_url: env::var("REDIS_URL").ok(),
        })
    }
}
