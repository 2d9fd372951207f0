use redis::aio::ConnectionManager;
use uuid::Uuid;

/// Listing cache TTL.
const LISTING_TTL_SECS: u64 = 60;

fn listing_key(owner_id: Uuid) -> String {
    format!("galleries:{}", owner_id)
}

/// Best-effort cache for gallery listings. Every failure degrades to a
/// cache miss; callers never see cache errors.
#[derive(Clone)]
pub enum ListingCache {
    Redis(ConnectionManager),
    Disabled,
}

impl ListingCache {
    pub fn disabled() -> Self {
        ListingCache::Disabled
    }

    /// Returns the cached listing JSON for an account, if warm.
    pub async fn get(&self, owner_id: Uuid) -> Option<String> {
        let ListingCache::Redis(conn) = self else {
            return None;
        };
        let mut conn = conn.clone();
        match redis::cmd("GET")
            .arg(listing_key(owner_id))
            .query_async::<Option<String>>(&mut conn)
            .await
        {
            Ok(cached) => cached,
            Err(e) => {
                tracing::warn!("Listing cache read failed: {}", e);
                None
            }
        }
    }

    /// Stores a listing JSON for an account.
    pub async fn put(&self, owner_id: Uuid, json: &str) {
        let ListingCache::Redis(conn) = self else {
            return;
        };
        let mut conn = conn.clone();
        if let Err(e) = redis::cmd("SET")
            .arg(listing_key(owner_id))
            .arg(json)
            .arg("EX")
            .arg(LISTING_TTL_SECS)
            .query_async::<()>(&mut conn)
            .await
        {
            tracing::warn!("Listing cache write failed: {}", e);
        }
    }

    /// Drops the cached listing for an account. Called after every
    /// successful gallery creation.
    pub async fn invalidate(&self, owner_id: Uuid) {
        let ListingCache::Redis(conn) = self else {
            return;
        };
        let mut conn = conn.clone();
        if let Err(e) = redis::cmd("DEL")
            .arg(listing_key(owner_id))
            .query_async::<()>(&mut conn)
            .await
        {
            tracing::warn!("Listing cache invalidation failed: {}", e);
        }
    }
}
