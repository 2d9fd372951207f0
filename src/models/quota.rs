use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A subscription tier recognized by the quota layer.
///
/// Unknown tier strings collapse to `None`, which is always restricted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    None,
    Free,
    Pro,
    Unlimited,
}

impl PlanTier {
    /// Parses a tier column value. Absent or unrecognized values map to
    /// `PlanTier::None`.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("free") => PlanTier::Free,
            Some("pro") => PlanTier::Pro,
            Some("unlimited") => PlanTier::Unlimited,
            _ => PlanTier::None,
        }
    }

    /// The maximum number of galleries the tier entitles, or `None` for
    /// the unlimited tier.
    pub fn max_galleries(&self) -> Option<i32> {
        match self {
            PlanTier::None => Some(0),
            PlanTier::Free => Some(3),
            PlanTier::Pro => Some(10),
            PlanTier::Unlimited => None,
        }
    }

    /// The per-gallery photo capacity ceiling, or `None` for the
    /// unlimited tier.
    pub fn max_photos_per_gallery(&self) -> Option<i32> {
        match self {
            PlanTier::None => Some(0),
            PlanTier::Free => Some(20),
            PlanTier::Pro => Some(100),
            PlanTier::Unlimited => None,
        }
    }

    /// Returns `true` for the unlimited tier, which bypasses count checks
    /// but remains subject to the expiry check.
    pub fn is_unlimited(&self) -> bool {
        matches!(self, PlanTier::Unlimited)
    }
}

/// The subscription-tier entitlement read from an account's profile row.
#[derive(Debug, Clone, Serialize)]
pub struct PlanQuota {
    /// The subscription tier.
    pub tier: PlanTier,
    /// Gallery slots remaining. Never decremented below zero.
    pub galleries_remaining: i32,
    /// Tier expiry. `None` means the tier does not expire.
    pub expires_at: Option<DateTime<Utc>>,
}

impl PlanQuota {
    /// Whether the account is restricted: tier absent, or tier expiry in
    /// the past. Unlimited-style tiers are still subject to this check.
    pub fn is_restricted(&self, now: DateTime<Utc>) -> bool {
        if self.tier == PlanTier::None {
            return true;
        }
        self.expires_at.is_some_and(|expires| expires <= now)
    }
}

/// An account profile row as seen by the quota layer.
#[derive(Debug, Clone)]
pub struct Profile {
    /// The owning account id.
    pub user_id: Uuid,
    /// The account's current entitlement.
    pub quota: PlanQuota,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn unknown_tier_strings_are_restricted() {
        assert_eq!(PlanTier::parse(None), PlanTier::None);
        assert_eq!(PlanTier::parse(Some("none")), PlanTier::None);
        assert_eq!(PlanTier::parse(Some("platinum")), PlanTier::None);
        assert_eq!(PlanTier::parse(Some("pro")), PlanTier::Pro);
    }

    #[test]
    fn expired_tier_is_restricted_even_when_unlimited() {
        let now = Utc::now();
        let quota = PlanQuota {
            tier: PlanTier::Unlimited,
            galleries_remaining: 0,
            expires_at: Some(now - Duration::days(1)),
        };
        assert!(quota.is_restricted(now));
    }

    #[test]
    fn live_tier_without_expiry_is_not_restricted() {
        let now = Utc::now();
        let quota = PlanQuota {
            tier: PlanTier::Free,
            galleries_remaining: 3,
            expires_at: None,
        };
        assert!(!quota.is_restricted(now));
    }
}
