use std::sync::Arc;

use anyhow::Result;
use redis::aio::ConnectionManager;

use crate::cache::ListingCache;
use crate::config::Config;
use crate::repositories::memory::MemoryStore;
use crate::repositories::postgres::PgStore;
use crate::repositories::store::{AuditSink, ProfileStore};
use crate::services::audit::ActivityLogger;
use crate::services::elevation::ElevationManager;
use crate::services::identity::{IdentityClient, SessionResolver};
use crate::services::ratelimit::{MemoryRateStore, RateLimiter, RedisRateStore};

/// The gateway's state.
#[derive(Clone)]
pub struct AppState {
    /// The gateway configuration.
    pub config: Config,
    /// Primary-session resolution.
    pub resolver: SessionResolver,
    /// Admin elevation issuance and verification.
    pub elevation: ElevationManager,
    /// The fixed-window rate limiter.
    pub limiter: RateLimiter,
    /// Account and gallery rows.
    pub store: Arc<dyn ProfileStore>,
    /// Best-effort audit logging.
    pub audit: ActivityLogger,
    /// Gallery listing cache.
    pub cache: ListingCache,
    /// Server-side identity-provider client.
    pub provider: IdentityClient,
}

impl AppState {
    /// Creates a new `AppState`, picking backends from the configuration:
    /// PostgreSQL vs in-memory rows, Redis vs process-local rate counters.
    ///
    /// # Arguments
    ///
    /// * `config` - The gateway configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        let (store, sink): (Arc<dyn ProfileStore>, Arc<dyn AuditSink>) =
            match &config.database_url {
                Some(url) => {
                    let pool = crate::db::create_pool(url)?;
                    let pg = Arc::new(PgStore::new(pool));
                    tracing::info!("✅ PostgreSQL store initialized");
                    (pg.clone(), pg)
                }
                None => {
                    let memory = Arc::new(MemoryStore::new());
                    tracing::warn!("⚠️ DATABASE_URL not set, using in-memory store");
                    (memory.clone(), memory)
                }
            };

        let redis = match &config.redis_url {
            Some(url) => {
                let client = redis::Client::open(url.as_str())?;
                let conn = ConnectionManager::new(client).await?;
                tracing::info!("✅ Redis connection manager initialized");
                Some(conn)
            }
            None => None,
        };

        let (limiter, cache) = match redis {
            Some(conn) => (
                RateLimiter::new(Arc::new(RedisRateStore::new(conn.clone()))),
                ListingCache::Redis(conn),
            ),
            None => {
                tracing::info!("✅ Rate limiter using process-local store");
                (
                    RateLimiter::new(Arc::new(MemoryRateStore::new())),
                    ListingCache::disabled(),
                )
            }
        };

        let elevation = ElevationManager::new(&config.elevation_key)?;

        Ok(AppState {
            config: config.clone(),
            resolver: SessionResolver::new(&config.identity_jwt_secret),
            elevation,
            limiter,
            store,
            audit: ActivityLogger::new(sink),
            cache,
            provider: IdentityClient::new(config),
        })
    }
}
