//! Navigation guards.
//!
//! Guards are pure decisions over a [`Session`]: no IO, no panics, no session
//! mutation. The caller performs the redirect.

use serde::Serialize;

use crate::landing::GUEST_HOME;
use crate::{RoleId, Session};

/// A navigation the caller should perform instead of rendering the route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    /// Target path.
    pub to: String,
    /// Originally requested location, kept so login can return the user to it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl Redirect {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            to: path.into(),
            from: None,
        }
    }

    pub fn preserving(path: impl Into<String>, from: impl Into<String>) -> Self {
        Self {
            to: path.into(),
            from: Some(from.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    Unauthenticated,
    RoleNotPermitted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GuardDecision {
    Allow,
    Redirect { kind: DenialKind, redirect: Redirect },
}

impl GuardDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardDecision::Allow)
    }

    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            GuardDecision::Allow => None,
            GuardDecision::Redirect { redirect, .. } => Some(redirect),
        }
    }
}

/// Gate that only lets authenticated sessions through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthenticationGate;

impl AuthenticationGate {
    /// Unauthenticated sessions are sent to the public landing page with the
    /// requested location preserved.
    pub fn check(&self, session: &Session, requested: &str) -> GuardDecision {
        if session.is_authenticated() {
            return GuardDecision::Allow;
        }

        tracing::debug!(requested, "authentication gate: redirecting guest");
        GuardDecision::Redirect {
            kind: DenialKind::Unauthenticated,
            redirect: Redirect::preserving(GUEST_HOME, requested),
        }
    }
}

/// Gate parameterized by an allow-list of roles.
///
/// Assumes the [`AuthenticationGate`] already ran; it never checks
/// authentication on its own. A `Guest` entry in the allow-list therefore
/// admits guests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGate {
    allowed: Vec<RoleId>,
    denied_route: String,
}

impl RoleGate {
    pub fn new(allowed: impl IntoIterator<Item = RoleId>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
            denied_route: GUEST_HOME.to_string(),
        }
    }

    /// Override where denied navigations go (e.g. a dedicated forbidden page).
    pub fn with_denied_route(mut self, route: impl Into<String>) -> Self {
        self.denied_route = route.into();
        self
    }

    pub fn allowed(&self) -> &[RoleId] {
        &self.allowed
    }

    pub fn denied_route(&self) -> &str {
        &self.denied_route
    }

    pub fn check(&self, session: &Session) -> GuardDecision {
        let role = session.current_role();
        if self.allowed.contains(&role) {
            return GuardDecision::Allow;
        }

        tracing::debug!(%role, denied_route = %self.denied_route, "role gate: role not permitted");
        GuardDecision::Redirect {
            kind: DenialKind::RoleNotPermitted,
            redirect: Redirect::to(self.denied_route.clone()),
        }
    }
}

/// Run both gates in order: authentication first, then the role allow-list.
pub fn check_route(session: &Session, requested: &str, role_gate: &RoleGate) -> GuardDecision {
    match AuthenticationGate.check(session, requested) {
        GuardDecision::Allow => role_gate.check(session),
        denied => denied,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::UserProfile;

    fn session(role: RoleId) -> Session {
        Session::for_user(UserProfile {
            id: "u".into(),
            email: None,
            full_name: None,
            role_code: role,
        })
    }

    #[test]
    fn authentication_gate_redirects_guest_and_preserves_location() {
        let decision = AuthenticationGate.check(&Session::guest(), "/admin/orders?page=2");
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                kind: DenialKind::Unauthenticated,
                redirect: Redirect {
                    to: "/guest/home".into(),
                    from: Some("/admin/orders?page=2".into()),
                },
            }
        );
    }

    #[test]
    fn authentication_gate_allows_signed_in_user() {
        assert!(AuthenticationGate.check(&session(RoleId::Customer), "/customer/home").is_allowed());
    }

    #[test]
    fn role_gate_denies_role_outside_allow_list() {
        let gate = RoleGate::new([RoleId::Manager]);
        let decision = gate.check(&session(RoleId::StaffPos));
        assert_eq!(decision.redirect(), Some(&Redirect::to("/guest/home")));
    }

    #[test]
    fn role_gate_permits_role_in_allow_list() {
        let gate = RoleGate::new([RoleId::StaffPos, RoleId::Manager]);
        assert!(gate.check(&session(RoleId::StaffPos)).is_allowed());
    }

    #[test]
    fn role_gate_denied_route_is_configurable() {
        let gate = RoleGate::new([RoleId::Admin]).with_denied_route("/forbidden");
        let decision = gate.check(&session(RoleId::Customer));
        assert_eq!(decision.redirect().map(|r| r.to.as_str()), Some("/forbidden"));
    }

    #[test]
    fn role_gate_does_not_check_authentication() {
        let gate = RoleGate::new([RoleId::Guest]);
        assert!(gate.check(&Session::guest()).is_allowed());
    }

    #[test]
    fn check_route_runs_authentication_first() {
        let gate = RoleGate::new([RoleId::Guest]);
        let decision = check_route(&Session::guest(), "/admin/dashboard", &gate);
        assert!(matches!(
            decision,
            GuardDecision::Redirect { kind: DenialKind::Unauthenticated, .. }
        ));
    }

    fn any_role() -> impl Strategy<Value = RoleId> {
        prop::sample::select(RoleId::ALL.to_vec())
    }

    proptest! {
        /// Property: the composed check allows exactly the authenticated
        /// sessions whose role is in the allow-list.
        #[test]
        fn composed_check_matches_membership(
            role in any_role(),
            allowed in prop::collection::vec(any_role(), 0..4),
        ) {
            let gate = RoleGate::new(allowed.clone());
            let s = if role.is_guest() { Session::guest() } else { session(role) };
            let decision = check_route(&s, "/somewhere", &gate);
            prop_assert_eq!(decision.is_allowed(), !role.is_guest() && allowed.contains(&role));
        }
    }
}
