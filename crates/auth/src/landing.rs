//! Role-landing table and route constants.

use crate::RoleId;

/// Public landing page (unauthenticated or role-denied navigation).
pub const GUEST_HOME: &str = "/guest/home";
/// Login entry point.
pub const GUEST_LOGIN: &str = "/guest/login";
pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";
pub const CUSTOMER_HOME: &str = "/customer/home";
/// Route the external auth provider redirects to with `?token=...`.
pub const AUTH_SUCCESS: &str = "/auth-success";

/// Default route for a role.
pub fn landing_route(role: RoleId) -> &'static str {
    match role {
        RoleId::SuperAdmin | RoleId::Admin => ADMIN_DASHBOARD,
        RoleId::Manager => "/manager/dashboard",
        RoleId::StaffPos => "/staff/pos",
        RoleId::StaffWarehouse => "/staff/warehouse",
        RoleId::StaffSupport => "/staff/support",
        RoleId::Customer => CUSTOMER_HOME,
        RoleId::Guest => GUEST_HOME,
    }
}

/// Top-level route segment owned by a role (`"/staff/pos"` -> `"staff"`).
pub fn route_segment(role: RoleId) -> &'static str {
    let route = landing_route(role);
    route
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
}

/// Destination after a completed sign-in: privileged roles go to the admin
/// dashboard, everyone else to the customer home.
pub fn post_login_route(role: RoleId) -> &'static str {
    if role.is_privileged() {
        ADMIN_DASHBOARD
    } else {
        CUSTOMER_HOME
    }
}

/// Login route carrying an error indicator (`/guest/login?error=NoToken`).
pub fn login_with_error(reason: &str) -> String {
    format!("{GUEST_LOGIN}?error={reason}")
}

/// Coarse path check: guest pages are public, every other path must sit under
/// the role's own top-level segment. Privileged roles also reach the admin
/// area, where [`post_login_route`] sends them.
pub fn can_access_path(role: RoleId, path: &str) -> bool {
    let segment = path
        .trim_start_matches('/')
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();

    segment == route_segment(RoleId::Guest)
        || segment == route_segment(role)
        || (role.is_privileged() && segment == route_segment(RoleId::Admin))
}
