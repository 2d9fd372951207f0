use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    error::Result,
    models::activity::ActivityLogEntry,
    models::gallery::Gallery,
    models::quota::Profile,
};

/// The relational store as seen by the quota layer: typed rows by key,
/// single-row operations only. No multi-statement transaction support is
/// assumed of implementations.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetches the profile row for an account, if one exists.
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>>;

    /// Whether a gallery slug is already taken anywhere in the namespace.
    async fn slug_exists(&self, slug: &str) -> Result<bool>;

    /// Inserts a gallery row.
    async fn insert_gallery(&self, gallery: &Gallery) -> Result<()>;

    /// Decrements the account's remaining gallery slots, floored at zero.
    async fn decrement_galleries_remaining(&self, user_id: Uuid) -> Result<()>;

    /// Lists the account's galleries, newest first.
    async fn list_galleries(&self, owner_id: Uuid) -> Result<Vec<Gallery>>;
}

/// The audit log sink. Appends are single-row writes; callers treat them
/// as best-effort.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Appends one audit entry.
    async fn append(&self, entry: &ActivityLogEntry) -> Result<()>;
}
