use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The resolved, currently-authenticated caller derived from the primary
/// session. Created per request, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// The account id assigned by the identity provider.
    pub id: Uuid,
    /// The account email as asserted by the provider.
    pub email: String,
}

impl Identity {
    /// Returns `true` when this identity is the fixed admin account.
    /// The comparison is case-sensitive.
    pub fn is_admin(&self, admin_email: &str) -> bool {
        self.email == admin_email
    }
}
