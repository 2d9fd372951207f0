use anyhow::Context;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tower_cookies::{Cookie, Cookies};
use tower_cookies::cookie::SameSite;
use tower_cookies::cookie::time;

use crate::crypto::token;

/// The admin elevation cookie.
pub const ADMIN_SESSION_COOKIE: &str = "admin_session";

/// Elevation lifetime. There is no refresh: after this the admin must
/// re-prove elevation regardless of continued activity.
pub const ELEVATION_TTL_HOURS: i64 = 8;

/// The state of the secondary admin session for one request, recomputed
/// on every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElevationStatus {
    /// No elevation cookie present.
    Absent,
    /// Cookie present but malformed or with a bad signature.
    Invalid,
    /// Signed cookie whose issuance is older than the lifetime.
    Expired { issued_at: DateTime<Utc> },
    /// A live elevation.
    Active { issued_at: DateTime<Utc> },
}

impl ElevationStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, ElevationStatus::Active { .. })
    }
}

/// Manages the secondary, time-boxed admin session layered on top of the
/// primary account session.
///
/// The cookie value is `<issued-millis>.<hex MAC>`: a plain timestamp
/// would be client-forgeable, so the issuance instant is authenticated
/// with a keyed BLAKE3 MAC.
#[derive(Clone)]
pub struct ElevationManager {
    key: [u8; 32],
}

impl ElevationManager {
    /// Creates a manager from a 32-byte signing key.
    pub fn new(key: &[u8]) -> anyhow::Result<Self> {
        let key: [u8; 32] = key
            .try_into()
            .context("elevation signing key must be exactly 32 bytes")?;
        Ok(Self { key })
    }

    /// Issues a fresh elevation token with `issued_at = now`.
    pub fn issue(&self, now: DateTime<Utc>) -> String {
        let millis = now.timestamp_millis().to_string();
        let mac = token::sign(&self.key, millis.as_bytes());
        format!("{}.{}", millis, mac)
    }

    /// Computes the elevation status for a raw cookie value.
    ///
    /// Validity is `now - issued_at < 8h`, strict, no grace period.
    /// Anything unverifiable is `Invalid`, never an error.
    pub fn status(&self, raw: Option<&str>, now: DateTime<Utc>) -> ElevationStatus {
        let Some(raw) = raw else {
            return ElevationStatus::Absent;
        };

        let Some((millis_str, mac_hex)) = raw.split_once('.') else {
            return ElevationStatus::Invalid;
        };

        if !token::verify(&self.key, millis_str.as_bytes(), mac_hex) {
            return ElevationStatus::Invalid;
        }

        let Ok(millis) = millis_str.parse::<i64>() else {
            return ElevationStatus::Invalid;
        };
        let Some(issued_at) = Utc.timestamp_millis_opt(millis).single() else {
            return ElevationStatus::Invalid;
        };

        if now - issued_at < Duration::hours(ELEVATION_TTL_HOURS) {
            ElevationStatus::Active { issued_at }
        } else {
            ElevationStatus::Expired { issued_at }
        }
    }

    /// Builds the elevation cookie for a freshly issued token.
    pub fn cookie(value: String) -> Cookie<'static> {
        let mut cookie = Cookie::new(ADMIN_SESSION_COOKIE, value);
        cookie.set_http_only(true);
        cookie.set_same_site(SameSite::Lax);
        cookie.set_path("/");
        cookie.set_max_age(time::Duration::hours(ELEVATION_TTL_HOURS));
        cookie
    }

    /// Deletes the elevation cookie from the client. The primary session
    /// is untouched.
    pub fn clear(cookies: &Cookies) {
        let mut cookie = Cookie::new(ADMIN_SESSION_COOKIE, "");
        cookie.set_path("/");
        cookies.remove(cookie);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> ElevationManager {
        ElevationManager::new(&[9u8; 32]).unwrap()
    }

    #[test]
    fn issued_token_is_active() {
        let m = manager();
        let now = Utc::now();
        let value = m.issue(now);
        match m.status(Some(&value), now) {
            ElevationStatus::Active { issued_at } => {
                assert_eq!(issued_at.timestamp_millis(), now.timestamp_millis());
            }
            other => panic!("expected Active, got {:?}", other),
        }
    }

    #[test]
    fn token_expires_at_exactly_eight_hours() {
        let m = manager();
        let issued = Utc::now();
        let value = m.issue(issued);

        let just_before = issued + Duration::hours(8) - Duration::seconds(1);
        assert!(m.status(Some(&value), just_before).is_active());

        let at_boundary = issued + Duration::hours(8);
        assert!(matches!(
            m.status(Some(&value), at_boundary),
            ElevationStatus::Expired { .. }
        ));
    }

    #[test]
    fn missing_cookie_is_absent() {
        assert_eq!(manager().status(None, Utc::now()), ElevationStatus::Absent);
    }

    #[test]
    fn forged_timestamp_is_invalid() {
        let m = manager();
        let now = Utc::now();
        let value = m.issue(now);
        let (_, mac) = value.split_once('.').unwrap();
        let forged = format!("{}.{}", now.timestamp_millis() + 60_000, mac);
        assert_eq!(m.status(Some(&forged), now), ElevationStatus::Invalid);
    }

    #[test]
    fn bare_timestamp_without_mac_is_invalid() {
        let m = manager();
        let now = Utc::now();
        let bare = now.timestamp_millis().to_string();
        assert_eq!(m.status(Some(&bare), now), ElevationStatus::Invalid);
    }

    #[test]
    fn token_from_another_key_is_invalid() {
        let other = ElevationManager::new(&[1u8; 32]).unwrap();
        let now = Utc::now();
        let value = other.issue(now);
        assert_eq!(manager().status(Some(&value), now), ElevationStatus::Invalid);
    }

    #[test]
    fn garbage_is_invalid() {
        let m = manager();
        let now = Utc::now();
        assert_eq!(m.status(Some(""), now), ElevationStatus::Invalid);
        assert_eq!(m.status(Some("abc.def"), now), ElevationStatus::Invalid);
        assert_eq!(m.status(Some("…"), now), ElevationStatus::Invalid);
    }
}
