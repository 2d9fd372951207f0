use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::Result,
    models::activity::ActivityLogEntry,
    models::gallery::Gallery,
    models::quota::{PlanQuota, PlanTier, Profile},
    repositories::store::{AuditSink, ProfileStore},
};

struct StoredProfile {
    tier: Option<String>,
    galleries_remaining: i32,
    tier_expires_at: Option<DateTime<Utc>>,
}

/// An in-process store used when no `DATABASE_URL` is configured (dev
/// mode) and by the test suite. Same single-row contract as `PgStore`.
#[derive(Default)]
pub struct MemoryStore {
    profiles: RwLock<HashMap<Uuid, StoredProfile>>,
    galleries: RwLock<Vec<Gallery>>,
    activity: RwLock<Vec<ActivityLogEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a profile row.
    pub fn put_profile(
        &self,
        user_id: Uuid,
        tier: Option<&str>,
        galleries_remaining: i32,
        tier_expires_at: Option<DateTime<Utc>>,
    ) {
        let mut profiles = self.profiles.write().unwrap_or_else(|e| e.into_inner());
        profiles.insert(
            user_id,
            StoredProfile {
                tier: tier.map(str::to_string),
                galleries_remaining,
                tier_expires_at,
            },
        );
    }

    /// Snapshot of the recorded audit entries, oldest first.
    pub fn activity_entries(&self) -> Vec<ActivityLogEntry> {
        self.activity
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let profiles = self.profiles.read().unwrap_or_else(|e| e.into_inner());
        Ok(profiles.get(&user_id).map(|stored| Profile {
            user_id,
            quota: PlanQuota {
                tier: PlanTier::parse(stored.tier.as_deref()),
                galleries_remaining: stored.galleries_remaining,
                expires_at: stored.tier_expires_at,
            },
        }))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let galleries = self.galleries.read().unwrap_or_else(|e| e.into_inner());
        Ok(galleries.iter().any(|g| g.slug == slug))
    }

    async fn insert_gallery(&self, gallery: &Gallery) -> Result<()> {
        let mut galleries = self.galleries.write().unwrap_or_else(|e| e.into_inner());
        galleries.push(gallery.clone());
        Ok(())
    }

    async fn decrement_galleries_remaining(&self, user_id: Uuid) -> Result<()> {
        let mut profiles = self.profiles.write().unwrap_or_else(|e| e.into_inner());
        if let Some(stored) = profiles.get_mut(&user_id) {
            stored.galleries_remaining = (stored.galleries_remaining - 1).max(0);
        }
        Ok(())
    }

    async fn list_galleries(&self, owner_id: Uuid) -> Result<Vec<Gallery>> {
        let galleries = self.galleries.read().unwrap_or_else(|e| e.into_inner());
        let mut owned: Vec<Gallery> = galleries
            .iter()
            .filter(|g| g.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned)
    }
}

#[async_trait]
impl AuditSink for MemoryStore {
    async fn append(&self, entry: &ActivityLogEntry) -> Result<()> {
        let mut activity = self.activity.write().unwrap_or_else(|e| e.into_inner());
        activity.push(entry.clone());
        Ok(())
    }
}
