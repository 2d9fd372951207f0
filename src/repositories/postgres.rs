use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use tokio_postgres::error::SqlState;
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    models::activity::ActivityLogEntry,
    models::gallery::Gallery,
    models::quota::{PlanQuota, PlanTier, Profile},
    repositories::store::{AuditSink, ProfileStore},
};

/// The PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    /// Creates a new `PgStore` over an existing pool.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

/// A helper function to map a `tokio_postgres::Row` to a `Profile`.
fn row_to_profile(row: &Row) -> Result<Profile> {
    let tier: Option<String> = row
        .try_get("tier")
        .map_err(|_| AppError::Internal("profiles row missing tier".to_string()))?;
    Ok(Profile {
        user_id: row
            .try_get("user_id")
            .map_err(|_| AppError::Internal("profiles row missing user_id".to_string()))?,
        quota: PlanQuota {
            tier: PlanTier::parse(tier.as_deref()),
            galleries_remaining: row.try_get("galleries_remaining").map_err(|_| {
                AppError::Internal("profiles row missing galleries_remaining".to_string())
            })?,
            expires_at: row.try_get("tier_expires_at").map_err(|_| {
                AppError::Internal("profiles row missing tier_expires_at".to_string())
            })?,
        },
    })
}

/// A helper function to map a `tokio_postgres::Row` to a `Gallery`.
fn row_to_gallery(row: &Row) -> Result<Gallery> {
    Ok(Gallery {
        id: row
            .try_get("id")
            .map_err(|_| AppError::Internal("galleries row missing id".to_string()))?,
        owner_id: row
            .try_get("owner_id")
            .map_err(|_| AppError::Internal("galleries row missing owner_id".to_string()))?,
        slug: row
            .try_get("slug")
            .map_err(|_| AppError::Internal("galleries row missing slug".to_string()))?,
        title: row
            .try_get("title")
            .map_err(|_| AppError::Internal("galleries row missing title".to_string()))?,
        photo_limit: row
            .try_get("photo_limit")
            .map_err(|_| AppError::Internal("galleries row missing photo_limit".to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|_| AppError::Internal("galleries row missing created_at".to_string()))?,
    })
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn fetch_profile(&self, user_id: Uuid) -> Result<Option<Profile>> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT user_id, tier, galleries_remaining, tier_expires_at
                FROM profiles
                WHERE user_id = $1
                "#,
                &[&user_id],
            )
            .await?;
        row.map(|r| row_to_profile(&r)).transpose()
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                r#"
                SELECT 1 AS present
                FROM galleries
                WHERE slug = $1
                "#,
                &[&slug],
            )
            .await?;
        Ok(row.is_some())
    }

    async fn insert_gallery(&self, gallery: &Gallery) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                r#"
                INSERT INTO galleries (id, owner_id, slug, title, photo_limit, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
                &[
                    &gallery.id,
                    &gallery.owner_id,
                    &gallery.slug,
                    &gallery.title,
                    &gallery.photo_limit,
                    &gallery.created_at,
                ],
            )
            .await
            .map_err(|e| {
                // Two concurrent creations can pass the slug_exists check;
                // the unique index is the backstop.
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    AppError::Validation("Gallery slug is already taken".to_string())
                } else {
                    AppError::Postgres(e)
                }
            })?;
        Ok(())
    }

    async fn decrement_galleries_remaining(&self, user_id: Uuid) -> Result<()> {
        let client = self.pool.get().await?;
        client
            .execute(
                r#"
                UPDATE profiles
                SET galleries_remaining = GREATEST(galleries_remaining - 1, 0)
                WHERE user_id = $1
                "#,
                &[&user_id],
            )
            .await?;
        Ok(())
    }

    async fn list_galleries(&self, owner_id: Uuid) -> Result<Vec<Gallery>> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                r#"
                SELECT id, owner_id, slug, title, photo_limit, created_at
                FROM galleries
                WHERE owner_id = $1
                ORDER BY created_at DESC
                "#,
                &[&owner_id],
            )
            .await?;
        rows.iter().map(row_to_gallery).collect()
    }
}

#[async_trait]
impl AuditSink for PgStore {
    async fn append(&self, entry: &ActivityLogEntry) -> Result<()> {
        let metadata = entry
            .metadata
            .as_ref()
            .map(sonic_rs::to_string)
            .transpose()
            .map_err(|e| AppError::Internal(format!("metadata serialization failed: {}", e)))?;

        let client = self.pool.get().await?;
        client
            .execute(
                r#"
                INSERT INTO activity_log
                    (identity_id, action, status, metadata, error_message, duration_ms)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
                &[
                    &entry.identity_id,
                    &entry.action,
                    &entry.status.as_str(),
                    &metadata,
                    &entry.error_message,
                    &entry.duration_ms,
                ],
            )
            .await?;
        Ok(())
    }
}
