//! Route table: which paths exist and which partition each belongs to.

use battlehub_core::session::Role;

use crate::guard::{evaluate, AuthState, GuardDecision, RouteAccess};

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/";
pub const USER_DASHBOARD_PATH: &str = "/dashboard";
pub const ADMIN_DASHBOARD_PATH: &str = "/admin";

const MATCH_MODES: [&str; 3] = ["squad", "duo", "solo"];

const USER_PAGES: [&str; 6] = [
    "help-support",
    "booked",
    "completed",
    "recharge",
    "wallet",
    "watch",
];

const ADMIN_PAGES: [&str; 7] = [
    "approve-payment",
    "create-match",
    "prize",
    "update-results",
    "registered-users",
    "live-links",
    "id-pass",
];

/// Access rule for `path`, or `None` when no route matches.
pub fn classify(path: &str) -> Option<RouteAccess> {
    let segments = segments(path);
    match segments.as_slice() {
        [] | ["login"] => Some(RouteAccess::Public),
        ["dashboard", rest @ ..] if is_user_page(rest) => Some(RouteAccess::UserOnly),
        ["admin"] => Some(RouteAccess::AdminOnly),
        ["admin", page] if ADMIN_PAGES.contains(page) => Some(RouteAccess::AdminOnly),
        _ => None,
    }
}

/// Guard decision for navigating to `path`. Unknown paths go to the login screen.
pub fn navigate(state: AuthState, path: &str) -> GuardDecision {
    match classify(path) {
        Some(access) => evaluate(state, access),
        None => GuardDecision::Redirect(LOGIN_PATH),
    }
}

/// Where a caller lands right after signing in.
pub fn landing_path(role: Role) -> &'static str {
    match role {
        Role::Admin => ADMIN_DASHBOARD_PATH,
        Role::User => USER_DASHBOARD_PATH,
    }
}

fn is_user_page(rest: &[&str]) -> bool {
    match rest {
        [] | ["matches"] => true,
        [page] => USER_PAGES.contains(page),
        ["matches", mode] | ["matches", mode, "join"] | ["matches", mode, "join", _] => {
            MATCH_MODES.contains(mode)
        }
        _ => false,
    }
}

fn segments(path: &str) -> Vec<&str> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').filter(|s| !s.is_empty()).collect()
}
