use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use redis::aio::ConnectionManager;

use crate::error::Result;

/// How often the background sweep purges lapsed windows.
pub const SWEEP_INTERVAL_SECS: u64 = 300;

/// Recognized rate-limit configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitPreset {
    /// Sensitive unauthenticated operations (login/registration).
    Auth,
    /// General API traffic.
    Api,
    /// Read-heavy endpoints.
    Read,
}

impl RateLimitPreset {
    /// `(max_requests, window_seconds)` for the preset.
    pub fn limits(&self) -> (u32, i64) {
        match self {
            RateLimitPreset::Auth => (5, 60),
            RateLimitPreset::Api => (30, 60),
            RateLimitPreset::Read => (100, 60),
        }
    }
}

/// The outcome of one rate-limit check.
#[derive(Debug, Clone, Copy)]
pub struct RateDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_in_seconds: i64,
}

/// The keyed counter store behind the limiter. The `hit` operation must
/// be atomic per key: lost updates under concurrent hits on the same key
/// would let a caller exceed the configured limit.
///
/// Implementations are interchangeable without touching limiter callers;
/// the in-memory store is per-instance, the Redis store is shared across
/// a horizontally scaled deployment.
#[async_trait]
pub trait RateStore: Send + Sync {
    /// Applies one fixed-window hit to `key` and returns the decision.
    async fn hit(
        &self,
        key: &str,
        max_requests: u32,
        window_seconds: i64,
        now: DateTime<Utc>,
    ) -> Result<RateDecision>;

    /// Drops the entry for `key`.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Purges lapsed windows, returning how many entries were dropped.
    async fn sweep(&self, now: DateTime<Utc>) -> Result<usize>;
}

struct RateLimitEntry {
    count: u32,
    window_reset_at: DateTime<Utc>,
}

/// Process-local fixed-window store.
#[derive(Default)]
pub struct MemoryRateStore {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn hit(
        &self,
        key: &str,
        max_requests: u32,
        window_seconds: i64,
        now: DateTime<Utc>,
    ) -> Result<RateDecision> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get_mut(key) {
            Some(entry) if now < entry.window_reset_at => {
                if entry.count >= max_requests {
                    // Denied hits do not mutate the live window.
                    return Ok(RateDecision {
                        allowed: false,
                        remaining: 0,
                        reset_in_seconds: (entry.window_reset_at - now).num_seconds().max(1),
                    });
                }
                entry.count += 1;
                Ok(RateDecision {
                    allowed: true,
                    remaining: max_requests - entry.count,
                    reset_in_seconds: (entry.window_reset_at - now).num_seconds().max(1),
                })
            }
            _ => {
                // First hit for the key, or a lapsed window.
                entries.insert(
                    key.to_string(),
                    RateLimitEntry {
                        count: 1,
                        window_reset_at: now + Duration::seconds(window_seconds),
                    },
                );
                Ok(RateDecision {
                    allowed: true,
                    remaining: max_requests.saturating_sub(1),
                    reset_in_seconds: window_seconds,
                })
            }
        }
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
        Ok(())
    }

    async fn sweep(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|_, entry| entry.window_reset_at > now);
        Ok(before - entries.len())
    }
}

/// Redis-backed fixed-window store for multi-instance deployments.
///
/// Window placement uses EXPIRE keyed off the TTL reply; Redis TTL
/// eviction replaces the periodic sweep.
#[derive(Clone)]
pub struct RedisRateStore {
    conn: ConnectionManager,
}

/// Interprets a TTL reply for a window key as
/// `(reset_in_seconds, needs_expire)`.
///
/// A non-positive TTL means the key carries no expiry: the first hit of
/// a window, or a crash between INCR and EXPIRE left the key permanent.
/// Such a key must be (re-)armed or it would deny its client forever.
fn window_ttl(ttl: i64, window_seconds: i64) -> (i64, bool) {
    if ttl > 0 {
        (ttl, false)
    } else {
        (window_seconds, true)
    }
}

impl RedisRateStore {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl RateStore for RedisRateStore {
    async fn hit(
        &self,
        key: &str,
        max_requests: u32,
        window_seconds: i64,
        _now: DateTime<Utc>,
    ) -> Result<RateDecision> {
        let mut conn = self.conn.clone();

        let count: i64 = redis::cmd("INCR").arg(key).query_async(&mut conn).await?;

        let ttl: i64 = redis::cmd("TTL").arg(key).query_async(&mut conn).await?;
        let (reset_in_seconds, needs_expire) = window_ttl(ttl, window_seconds);
        if needs_expire {
            let _: () = redis::cmd("EXPIRE")
                .arg(key)
                .arg(window_seconds)
                .query_async(&mut conn)
                .await?;
        }

        if count > max_requests as i64 {
            return Ok(RateDecision {
                allowed: false,
                remaining: 0,
                reset_in_seconds,
            });
        }

        Ok(RateDecision {
            allowed: true,
            remaining: max_requests.saturating_sub(count as u32),
            reset_in_seconds,
        })
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(())
    }

    async fn sweep(&self, _now: DateTime<Utc>) -> Result<usize> {
        // TTL eviction handles expiry server-side.
        Ok(0)
    }
}

/// Fixed-window rate limiter over an injectable keyed store.
///
/// Fixed windows admit a burst of up to twice the limit at a window
/// boundary; that trade-off is deliberate and preserved here.
#[derive(Clone)]
pub struct RateLimiter {
    store: Arc<dyn RateStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn RateStore>) -> Self {
        Self { store }
    }

    /// Checks one hit against a purpose-prefixed key, e.g. `auth:1.2.3.4`.
    pub async fn check(
        &self,
        key: &str,
        max_requests: u32,
        window_seconds: i64,
        now: DateTime<Utc>,
    ) -> Result<RateDecision> {
        self.store.hit(key, max_requests, window_seconds, now).await
    }

    /// Checks one hit under a preset configuration.
    pub async fn check_preset(
        &self,
        preset: RateLimitPreset,
        key: &str,
        now: DateTime<Utc>,
    ) -> Result<RateDecision> {
        let (max_requests, window_seconds) = preset.limits();
        self.check(key, max_requests, window_seconds, now).await
    }

    /// Drops the counter for a key.
    pub async fn reset(&self, key: &str) -> Result<()> {
        self.store.remove(key).await
    }

    /// Purges lapsed windows.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<usize> {
        self.store.sweep(now).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter() -> RateLimiter {
        RateLimiter::new(Arc::new(MemoryRateStore::new()))
    }

    #[tokio::test]
    async fn five_hits_then_denied_then_fresh_window() {
        let limiter = limiter();
        let now = Utc::now();

        for expected_remaining in [4, 3, 2, 1, 0] {
            let d = limiter.check("auth:1.2.3.4", 5, 60, now).await.unwrap();
            assert!(d.allowed);
            assert_eq!(d.remaining, expected_remaining);
        }

        let denied = limiter.check("auth:1.2.3.4", 5, 60, now).await.unwrap();
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert!(denied.reset_in_seconds > 0);

        let later = now + Duration::seconds(61);
        let fresh = limiter.check("auth:1.2.3.4", 5, 60, later).await.unwrap();
        assert!(fresh.allowed);
        assert_eq!(fresh.remaining, 4);
    }

    #[tokio::test]
    async fn denied_hits_do_not_extend_the_window() {
        let limiter = limiter();
        let now = Utc::now();

        for _ in 0..5 {
            limiter.check("auth:k", 5, 60, now).await.unwrap();
        }
        // Hammering while denied must not push the reset out.
        for _ in 0..10 {
            let d = limiter.check("auth:k", 5, 60, now).await.unwrap();
            assert!(!d.allowed);
        }

        let after_window = now + Duration::seconds(61);
        let d = limiter.check("auth:k", 5, 60, after_window).await.unwrap();
        assert!(d.allowed);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let limiter = limiter();
        let now = Utc::now();

        for _ in 0..5 {
            limiter.check("auth:a", 5, 60, now).await.unwrap();
        }
        let other = limiter.check("auth:b", 5, 60, now).await.unwrap();
        assert!(other.allowed);
        assert_eq!(other.remaining, 4);
    }

    #[tokio::test]
    async fn reset_clears_a_key() {
        let limiter = limiter();
        let now = Utc::now();

        for _ in 0..5 {
            limiter.check("auth:a", 5, 60, now).await.unwrap();
        }
        limiter.reset("auth:a").await.unwrap();
        let d = limiter.check("auth:a", 5, 60, now).await.unwrap();
        assert!(d.allowed);
        assert_eq!(d.remaining, 4);
    }

    #[tokio::test]
    async fn sweep_purges_only_lapsed_windows() {
        let store = MemoryRateStore::new();
        let now = Utc::now();

        store.hit("auth:old", 5, 60, now).await.unwrap();
        store.hit("auth:new", 5, 600, now).await.unwrap();

        let purged = store.sweep(now + Duration::seconds(120)).await.unwrap();
        assert_eq!(purged, 1);

        // The surviving key keeps its live window count.
        let d = store
            .hit("auth:new", 5, 600, now + Duration::seconds(120))
            .await
            .unwrap();
        assert_eq!(d.remaining, 3);
    }

    #[tokio::test]
    async fn concurrent_hits_never_exceed_the_limit() {
        let limiter = limiter();
        let now = Utc::now();

        let mut handles = Vec::new();
        for _ in 0..20 {
            let limiter = limiter.clone();
            handles.push(tokio::spawn(async move {
                limiter.check("auth:shared", 5, 60, now).await.unwrap()
            }));
        }

        let mut allowed = 0;
        for handle in handles {
            if handle.await.unwrap().allowed {
                allowed += 1;
            }
        }
        assert_eq!(allowed, 5);
    }

    #[test]
    fn window_ttl_rearms_keys_without_expiry() {
        // Live windows keep their remaining TTL.
        assert_eq!(window_ttl(30, 60), (30, false));
        assert_eq!(window_ttl(60, 60), (60, false));
        // -1 (no expiry) and -2 (missing) both force a fresh window.
        assert_eq!(window_ttl(-1, 60), (60, true));
        assert_eq!(window_ttl(-2, 60), (60, true));
    }

    #[test]
    fn presets_match_the_recognized_configurations() {
        assert_eq!(RateLimitPreset::Auth.limits(), (5, 60));
        assert_eq!(RateLimitPreset::Api.limits(), (30, 60));
        assert_eq!(RateLimitPreset::Read.limits(), (100, 60));
    }
}
