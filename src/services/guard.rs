use crate::models::identity::Identity;
use crate::services::elevation::ElevationStatus;

/// The protected account area.
pub const DASHBOARD_PREFIX: &str = "/dashboard";
/// Public-only auth pages.
pub const AUTH_PAGES: [&str; 2] = ["/login", "/register"];
/// The admin area.
pub const ADMIN_PREFIX: &str = "/admin";
/// The admin login page, the only admin path reachable without elevation.
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";

/// Redirect targets.
pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const ADMIN_HOME_PATH: &str = "/admin";

/// The outcome of guard evaluation. Computed fresh per request, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteVerdict {
    /// Run the guarded handler.
    Allow,
    /// Redirect without executing the guarded handler. `clear_elevation`
    /// orders the admin elevation cookie deleted as a side effect.
    Redirect {
        location: &'static str,
        clear_elevation: bool,
    },
}

impl RouteVerdict {
    fn redirect(location: &'static str) -> Self {
        RouteVerdict::Redirect {
            location,
            clear_elevation: false,
        }
    }

    fn redirect_and_clear(location: &'static str) -> Self {
        RouteVerdict::Redirect {
            location,
            clear_elevation: true,
        }
    }
}

/// Whether a path is a static asset exempt from guard evaluation.
pub fn is_static_asset(path: &str) -> bool {
    const IMAGE_EXTENSIONS: [&str; 7] =
        [".png", ".jpg", ".jpeg", ".gif", ".webp", ".svg", ".ico"];

    path.starts_with("/_next/static")
        || path.starts_with("/_next/image")
        || path == "/favicon.ico"
        || IMAGE_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

fn is_under(path: &str, prefix: &str) -> bool {
    path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
}

/// Evaluates the route-protection policy for one request.
///
/// The policy table is checked in order, first match wins. The function is
/// pure: identical inputs always yield identical verdicts, and redirects
/// carry the cookie-clearing side effect as data rather than performing it.
///
/// # Arguments
///
/// * `path` - The request path.
/// * `identity` - The resolved caller, if any. Resolution failures must be
///   normalized to `None` before calling.
/// * `elevation` - The admin elevation status for this request.
/// * `admin_email` - The single allowed admin email.
pub fn evaluate(
    path: &str,
    identity: Option<&Identity>,
    elevation: &ElevationStatus,
    admin_email: &str,
) -> RouteVerdict {
    // 1. Protected account area requires a primary identity.
    if is_under(path, DASHBOARD_PREFIX) && identity.is_none() {
        return RouteVerdict::redirect(LOGIN_PATH);
    }

    // 2. Auth pages are public-only.
    if AUTH_PAGES.contains(&path) && identity.is_some() {
        return RouteVerdict::redirect(DASHBOARD_PATH);
    }

    // 3. Admin area.
    if is_under(path, ADMIN_PREFIX) {
        let is_admin = identity.is_some_and(|id| id.is_admin(admin_email));

        if path == ADMIN_LOGIN_PATH {
            // Already elevated admins skip the login form.
            if is_admin && elevation.is_active() {
                return RouteVerdict::redirect(ADMIN_HOME_PATH);
            }
            return RouteVerdict::Allow;
        }

        if !is_admin || !elevation.is_active() {
            // Clearing the cookie keeps a stale token from silently
            // re-validating on a later request.
            return RouteVerdict::redirect_and_clear(ADMIN_LOGIN_PATH);
        }
        return RouteVerdict::Allow;
    }

    // 4. Everything else.
    RouteVerdict::Allow
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    const ADMIN: &str = "admin@lumera.io";

    fn identity(email: &str) -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: email.to_string(),
        }
    }

    fn active() -> ElevationStatus {
        ElevationStatus::Active {
            issued_at: Utc::now(),
        }
    }

    #[test]
    fn dashboard_without_identity_redirects_to_login() {
        for path in ["/dashboard", "/dashboard/galleries", "/dashboard/settings/plan"] {
            assert_eq!(
                evaluate(path, None, &ElevationStatus::Absent, ADMIN),
                RouteVerdict::redirect(LOGIN_PATH),
            );
        }
    }

    #[test]
    fn dashboard_prefix_does_not_match_lookalike_paths() {
        assert_eq!(
            evaluate("/dashboarding", None, &ElevationStatus::Absent, ADMIN),
            RouteVerdict::Allow,
        );
    }

    #[test]
    fn auth_pages_with_identity_redirect_to_dashboard() {
        let id = identity("ana@example.com");
        for path in ["/login", "/register"] {
            assert_eq!(
                evaluate(path, Some(&id), &ElevationStatus::Absent, ADMIN),
                RouteVerdict::redirect(DASHBOARD_PATH),
            );
        }
    }

    #[test]
    fn auth_pages_without_identity_are_allowed() {
        assert_eq!(
            evaluate("/login", None, &ElevationStatus::Absent, ADMIN),
            RouteVerdict::Allow,
        );
    }

    #[test]
    fn admin_login_with_elevated_admin_redirects_home() {
        let id = identity(ADMIN);
        assert_eq!(
            evaluate(ADMIN_LOGIN_PATH, Some(&id), &active(), ADMIN),
            RouteVerdict::redirect(ADMIN_HOME_PATH),
        );
    }

    #[test]
    fn admin_login_without_elevation_is_allowed_so_the_form_can_run() {
        let id = identity(ADMIN);
        for status in [
            ElevationStatus::Absent,
            ElevationStatus::Invalid,
            ElevationStatus::Expired {
                issued_at: Utc::now(),
            },
        ] {
            assert_eq!(
                evaluate(ADMIN_LOGIN_PATH, Some(&id), &status, ADMIN),
                RouteVerdict::Allow,
            );
        }
    }

    #[test]
    fn admin_path_requires_identity_admin_email_and_active_elevation() {
        let admin = identity(ADMIN);
        assert_eq!(
            evaluate("/admin/accounts", Some(&admin), &active(), ADMIN),
            RouteVerdict::Allow,
        );
    }

    #[test]
    fn admin_path_failures_redirect_and_clear_the_cookie() {
        let admin = identity(ADMIN);
        let other = identity("ana@example.com");
        let cases: Vec<(Option<&Identity>, ElevationStatus)> = vec![
            (None, active()),
            (Some(&other), active()),
            (Some(&admin), ElevationStatus::Absent),
            (Some(&admin), ElevationStatus::Invalid),
            (
                Some(&admin),
                ElevationStatus::Expired {
                    issued_at: Utc::now(),
                },
            ),
        ];
        for (id, status) in cases {
            assert_eq!(
                evaluate("/admin/accounts", id, &status, ADMIN),
                RouteVerdict::redirect_and_clear(ADMIN_LOGIN_PATH),
            );
        }
    }

    #[test]
    fn admin_email_comparison_is_case_sensitive() {
        let shouty = identity("ADMIN@LUMERA.IO");
        assert_eq!(
            evaluate("/admin/accounts", Some(&shouty), &active(), ADMIN),
            RouteVerdict::redirect_and_clear(ADMIN_LOGIN_PATH),
        );
    }

    #[test]
    fn unmatched_paths_are_allowed() {
        assert_eq!(
            evaluate("/", None, &ElevationStatus::Absent, ADMIN),
            RouteVerdict::Allow,
        );
        assert_eq!(
            evaluate("/pricing", None, &ElevationStatus::Absent, ADMIN),
            RouteVerdict::Allow,
        );
        assert_eq!(
            evaluate("/api/galleries", None, &ElevationStatus::Absent, ADMIN),
            RouteVerdict::Allow,
        );
    }

    #[test]
    fn static_assets_are_exempt() {
        assert!(is_static_asset("/_next/static/chunks/main.js"));
        assert!(is_static_asset("/_next/image"));
        assert!(is_static_asset("/favicon.ico"));
        assert!(is_static_asset("/covers/hero.webp"));
        assert!(!is_static_asset("/dashboard"));
    }

    #[test]
    fn evaluation_is_idempotent() {
        let id = identity(ADMIN);
        let status = ElevationStatus::Expired {
            issued_at: Utc::now(),
        };
        let first = evaluate("/admin/accounts", Some(&id), &status, ADMIN);
        let second = evaluate("/admin/accounts", Some(&id), &status, ADMIN);
        assert_eq!(first, second);
    }
}
