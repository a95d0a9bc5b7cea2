use battlehub_core::session::Role;

use crate::routes::{ADMIN_DASHBOARD_PATH, LOGIN_PATH, USER_DASHBOARD_PATH};

/// Who is navigating, as far as the guard is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    AuthenticatedUser,
    AuthenticatedAdmin,
}

impl AuthState {
    pub fn from_role(role: Option<Role>) -> Self {
        match role {
            None => AuthState::Anonymous,
            Some(Role::User) => AuthState::AuthenticatedUser,
            Some(Role::Admin) => AuthState::AuthenticatedAdmin,
        }
    }
}

/// Which partition a route belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    Public,
    UserOnly,
    AdminOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(&'static str),
}

/// Decide whether `state` may enter a route with the given access rule.
pub fn evaluate(state: AuthState, access: RouteAccess) -> GuardDecision {
    match (state, access) {
        (_, RouteAccess::Public) => GuardDecision::Allow,
        (AuthState::Anonymous, _) => GuardDecision::Redirect(LOGIN_PATH),
        (AuthState::AuthenticatedUser, RouteAccess::AdminOnly) => {
            GuardDecision::Redirect(USER_DASHBOARD_PATH)
        }
        (AuthState::AuthenticatedAdmin, RouteAccess::UserOnly) => {
            GuardDecision::Redirect(ADMIN_DASHBOARD_PATH)
        }
        (AuthState::AuthenticatedUser, RouteAccess::UserOnly)
        | (AuthState::AuthenticatedAdmin, RouteAccess::AdminOnly) => GuardDecision::Allow,
    }
}
