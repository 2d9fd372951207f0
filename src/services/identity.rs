use axum::http::HeaderMap;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{
    config::Config,
    error::{AppError, Result},
    models::identity::Identity,
};

/// The primary session cookie carrying the provider-issued access token.
pub const ACCESS_COOKIE: &str = "lumera_access";

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    email: String,
    #[allow(dead_code)]
    exp: usize,
}

/// Resolves the caller's primary session by verifying the provider-issued
/// access token locally.
///
/// Resolution never fails a request: every failure mode (missing token,
/// bad signature, expired token, malformed claims) normalizes to "no
/// identity".
#[derive(Clone)]
pub struct SessionResolver {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionResolver {
    /// Creates a resolver from the provider's shared verification secret.
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Resolves the identity for one request: `lumera_access` cookie
    /// first, then an `Authorization: Bearer` header.
    pub fn resolve(&self, cookies: &Cookies, headers: &HeaderMap) -> Option<Identity> {
        let token = cookies
            .get(ACCESS_COOKIE)
            .map(|cookie| cookie.value().to_string())
            .or_else(|| {
                headers
                    .get(http::header::AUTHORIZATION)
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.strip_prefix("Bearer "))
                    .map(str::to_string)
            })?;

        self.verify(&token)
    }

    /// Verifies a raw access token.
    pub fn verify(&self, token: &str) -> Option<Identity> {
        let data = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("Access token rejected: {}", e);
                return None;
            }
        };

        let id = match Uuid::parse_str(&data.claims.sub) {
            Ok(id) => id,
            Err(_) => {
                tracing::debug!("Access token has a non-uuid subject");
                return None;
            }
        };

        Some(Identity {
            id,
            email: data.claims.email,
        })
    }
}

/// A provider-issued session returned by the token/signup endpoints.
#[derive(Debug, Deserialize)]
pub struct ProviderSession {
    pub access_token: Option<String>,
    pub expires_in: Option<i64>,
}

/// Server-side client for the external identity provider. The service
/// key never leaves this process.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl IdentityClient {
    /// Creates a client from the gateway configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.identity_provider_url.trim_end_matches('/').to_string(),
            service_key: config.identity_service_key.to_string(),
        }
    }

    async fn credential_call(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header("apikey", &self.service_key)
            .json(&sonic_rs::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AppError::IdentityProvider(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }
        if !status.is_success() {
            return Err(AppError::IdentityProvider(format!(
                "provider answered {}",
                status
            )));
        }

        response
            .json::<ProviderSession>()
            .await
            .map_err(|e| AppError::IdentityProvider(e.to_string()))
    }

    /// Exchanges primary credentials for a session.
    pub async fn password_login(&self, email: &str, password: &str) -> Result<ProviderSession> {
        self.credential_call("/auth/v1/token?grant_type=password", email, password)
            .await
    }

    /// Registers a new account.
    pub async fn register(&self, email: &str, password: &str) -> Result<ProviderSession> {
        self.credential_call("/auth/v1/signup", email, password).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    const SECRET: &str = "test-secret";

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        email: String,
        exp: usize,
    }

    fn mint(sub: &str, email: &str, exp_offset_secs: i64) -> String {
        let claims = TestClaims {
            sub: sub.to_string(),
            email: email.to_string(),
            exp: (chrono::Utc::now().timestamp() + exp_offset_secs) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_resolves() {
        let resolver = SessionResolver::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = mint(&user_id.to_string(), "ana@example.com", 3600);

        let identity = resolver.verify(&token).unwrap();
        assert_eq!(identity.id, user_id);
        assert_eq!(identity.email, "ana@example.com");
    }

    #[test]
    fn expired_token_normalizes_to_none() {
        let resolver = SessionResolver::new(SECRET);
        let token = mint(&Uuid::new_v4().to_string(), "ana@example.com", -3600);
        assert!(resolver.verify(&token).is_none());
    }

    #[test]
    fn wrong_secret_normalizes_to_none() {
        let resolver = SessionResolver::new("other-secret");
        let token = mint(&Uuid::new_v4().to_string(), "ana@example.com", 3600);
        assert!(resolver.verify(&token).is_none());
    }

    #[test]
    fn non_uuid_subject_normalizes_to_none() {
        let resolver = SessionResolver::new(SECRET);
        let token = mint("not-a-uuid", "ana@example.com", 3600);
        assert!(resolver.verify(&token).is_none());
    }

    #[test]
    fn garbage_token_normalizes_to_none() {
        let resolver = SessionResolver::new(SECRET);
        assert!(resolver.verify("garbage").is_none());
    }
}
